//! In-memory [`Messenger`] for tests.
//!
//! Records every outbound call in order, serves canned reactions, and can be
//! switched into a failing mode to exercise downstream error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use gohan_core::{ChannelId, MessageTs, UserId};
use tokio::sync::Notify;

use super::error::SlackError;
use super::messenger::Messenger;
use super::types::{Block, Reaction};

/// An outbound call captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    /// `post_message`.
    Message { channel: String, text: String },
    /// `post_ephemeral`; blocks are kept as JSON for easy inspection.
    Ephemeral {
        channel: String,
        user: String,
        text: String,
        blocks: serde_json::Value,
    },
    /// `get_reactions`.
    ReactionsFetched { channel: String, ts: String },
    /// `replace_message`.
    Replaced {
        response_url: String,
        text: String,
        blocks: serde_json::Value,
    },
    /// `create_conversation`.
    ConversationCreated { name: String },
}

/// Records calls instead of talking to Slack.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    reactions: Mutex<Vec<Reaction>>,
    failing: AtomicBool,
    changed: Notify,
}

impl RecordingMessenger {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these reactions from `get_reactions`.
    #[must_use]
    pub fn with_reactions(self, reactions: Vec<Reaction>) -> Self {
        *self.reactions.lock().unwrap_or_else(PoisonError::into_inner) = reactions;
        self
    }

    /// Make every subsequent call fail with [`SlackError::Api`].
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Everything recorded so far, in call order.
    #[must_use]
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Texts of the channel messages recorded so far, in call order.
    #[must_use]
    pub fn posted_texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Wait until at least `count` calls are recorded or `timeout` elapses,
    /// then return what was recorded.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Sent> {
        let wait = async {
            loop {
                let notified = self.changed.notified();
                if self.sent.lock().unwrap_or_else(PoisonError::into_inner).len() >= count {
                    return;
                }
                notified.await;
            }
        };
        let _ = tokio::time::timeout(timeout, wait).await;
        self.sent()
    }

    fn record(&self, sent: Sent) -> Result<(), SlackError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlackError::Api("recording_messenger_failure".to_string()));
        }
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(sent);
        self.changed.notify_waiters();
        Ok(())
    }
}

fn blocks_json(blocks: &[Block]) -> serde_json::Value {
    serde_json::to_value(blocks).unwrap_or(serde_json::Value::Null)
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), SlackError> {
        self.record(Sent::Message {
            channel: channel.to_string(),
            text: text.to_string(),
        })
    }

    async fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &UserId,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError> {
        self.record(Sent::Ephemeral {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
            blocks: blocks_json(&blocks),
        })
    }

    async fn get_reactions(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Vec<Reaction>, SlackError> {
        self.record(Sent::ReactionsFetched {
            channel: channel.to_string(),
            ts: ts.to_string(),
        })?;
        Ok(self
            .reactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn replace_message(
        &self,
        response_url: &str,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError> {
        self.record(Sent::Replaced {
            response_url: response_url.to_string(),
            text: text.to_string(),
            blocks: blocks_json(&blocks),
        })
    }

    async fn create_conversation(&self, name: &str) -> Result<ChannelId, SlackError> {
        self.record(Sent::ConversationCreated {
            name: name.to_string(),
        })?;
        Ok(ChannelId::new(format!("C{}", name.len())))
    }
}
