//! The outbound messaging interface used by the command and interaction
//! handlers.
//!
//! Handlers never talk to the Slack Web API directly; they go through
//! [`Messenger`], which [`SlackClient`](super::SlackClient) implements for
//! production and [`RecordingMessenger`](super::testing::RecordingMessenger)
//! implements for tests.

use async_trait::async_trait;
use gohan_core::{ChannelId, MessageTs, UserId};

use super::error::SlackError;
use super::types::{Block, Reaction};

/// Outbound Slack operations the bot depends on.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a plain text message to a channel.
    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), SlackError>;

    /// Post a message only `user` can see.
    async fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &UserId,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError>;

    /// Fetch every reaction on the message at `ts`.
    async fn get_reactions(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Vec<Reaction>, SlackError>;

    /// Replace the interactive message behind `response_url` in place.
    async fn replace_message(
        &self,
        response_url: &str,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError>;

    /// Create a public channel and return its ID.
    async fn create_conversation(&self, name: &str) -> Result<ChannelId, SlackError>;
}
