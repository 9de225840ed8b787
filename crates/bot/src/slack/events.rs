//! Events API envelope parsing.
//!
//! Slack delivers two kinds of envelope to the events endpoint: a one-time
//! `url_verification` handshake while the endpoint is being registered, and
//! `event_callback` wrappers around the actual event. Only `app_mention`
//! inner events are acted on; every other inner event type decodes to
//! [`InnerEvent::Unknown`] and is ignored.

use gohan_core::{ChannelId, MessageTs, UserId};
use serde::Deserialize;

use super::error::SlackError;
use super::signature::VerifiedBody;

/// Outer Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Endpoint ownership check; the challenge must be echoed verbatim.
    UrlVerification {
        /// Token to echo back.
        challenge: String,
    },
    /// A subscribed event.
    EventCallback {
        /// The wrapped event.
        event: InnerEvent,
    },
}

impl EventEnvelope {
    /// Decode an authenticated events body.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidPayload`] if the body is not a valid
    /// envelope.
    pub fn parse(body: &VerifiedBody) -> Result<Self, SlackError> {
        serde_json::from_slice(body.as_bytes()).map_err(|e| SlackError::InvalidPayload(e.to_string()))
    }
}

/// The event inside an `event_callback` envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum InnerEvent {
    /// The bot was mentioned in a channel.
    #[serde(rename = "app_mention")]
    AppMention(MentionEvent),

    /// Any other event type - silently ignored.
    #[serde(other)]
    Unknown,
}

/// An `app_mention` event.
#[derive(Debug, Clone, Deserialize)]
pub struct MentionEvent {
    /// Channel the mention was posted in.
    pub channel: ChannelId,
    /// User who mentioned the bot.
    pub user: UserId,
    /// Full message text, starting with the mention.
    #[serde(default)]
    pub text: String,
    /// Timestamp of the mention message.
    pub ts: MessageTs,
}
