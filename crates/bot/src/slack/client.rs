//! Slack Web API client.
//!
//! Provides the production [`Messenger`] implementation: posting channel and
//! ephemeral messages, reading reactions, creating channels, and replacing
//! interactive messages through a `response_url`.

use async_trait::async_trait;
use gohan_core::{ChannelId, MessageTs, UserId};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::error::SlackError;
use super::messenger::Messenger;
use super::types::{
    Block, ConversationsCreateResponse, EphemeralMessage, PostEphemeralResponse,
    PostMessageResponse, Reaction, ReactionsResponse, ResponseUrlMessage, SlackMessage,
};

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack API client for sending messages and reading reactions.
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    bot_token: SecretString,
    /// Web API base URL (overridable for tests against a local server).
    api_base: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    /// Create a new Slack client.
    #[must_use]
    pub fn new(bot_token: SecretString) -> Self {
        Self::with_api_base(bot_token, SLACK_API_BASE)
    }

    /// Create a client that talks to a different Web API base URL.
    #[must_use]
    pub fn with_api_base(bot_token: SecretString, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bot_token,
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{method}", self.api_base.trim_end_matches('/'))
    }
}

/// Turn an `ok: false` reply into [`SlackError::Api`].
fn ensure_ok(ok: bool, error: Option<String>, what: &str) -> Result<(), SlackError> {
    if ok {
        return Ok(());
    }
    error!(error = ?error, "Slack API error {what}");
    Err(SlackError::Api(
        error.unwrap_or_else(|| "Unknown error".to_string()),
    ))
}

#[async_trait]
impl Messenger for SlackClient {
    #[instrument(skip(self, text), fields(channel = %channel))]
    async fn post_message(&self, channel: &ChannelId, text: &str) -> Result<(), SlackError> {
        let message = SlackMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint("chat.postMessage"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&message)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        ensure_ok(result.ok, result.error, "posting message")?;

        debug!(ts = ?result.ts, "Message posted to Slack");

        Ok(())
    }

    #[instrument(skip(self, text, blocks), fields(channel = %channel, user = %user))]
    async fn post_ephemeral(
        &self,
        channel: &ChannelId,
        user: &UserId,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError> {
        let message = EphemeralMessage {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
            blocks,
        };

        let response = self
            .client
            .post(self.endpoint("chat.postEphemeral"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&message)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: PostEphemeralResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        ensure_ok(result.ok, result.error, "posting ephemeral message")?;

        debug!(message_ts = ?result.message_ts, "Ephemeral message posted");

        Ok(())
    }

    #[instrument(skip(self), fields(channel = %channel, ts = %ts))]
    async fn get_reactions(
        &self,
        channel: &ChannelId,
        ts: &MessageTs,
    ) -> Result<Vec<Reaction>, SlackError> {
        // Read methods only accept form-encoded arguments
        let params = [
            ("channel", channel.as_str()),
            ("timestamp", ts.as_str()),
            ("full", "true"),
        ];

        let response = self
            .client
            .post(self.endpoint("reactions.get"))
            .bearer_auth(self.bot_token.expose_secret())
            .form(&params)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: ReactionsResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        ensure_ok(result.ok, result.error, "fetching reactions")?;

        let reactions = result.message.map(|m| m.reactions).unwrap_or_default();
        debug!(count = reactions.len(), "Fetched reactions");

        Ok(reactions)
    }

    #[instrument(skip(self, text, blocks))]
    async fn replace_message(
        &self,
        response_url: &str,
        text: &str,
        blocks: Vec<Block>,
    ) -> Result<(), SlackError> {
        let message = ResponseUrlMessage {
            replace_original: true,
            text: text.to_string(),
            blocks,
        };

        let response = self
            .client
            .post(response_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SlackError::Response(format!(
                "Response URL returned {status}: {body}"
            )));
        }

        debug!("Replaced original message via response_url");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_conversation(&self, name: &str) -> Result<ChannelId, SlackError> {
        #[derive(serde::Serialize)]
        struct CreateConversation<'a> {
            name: &'a str,
            is_private: bool,
        }

        let response = self
            .client
            .post(self.endpoint("conversations.create"))
            .bearer_auth(self.bot_token.expose_secret())
            .json(&CreateConversation {
                name,
                is_private: false,
            })
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        let result: ConversationsCreateResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Response(e.to_string()))?;

        ensure_ok(result.ok, result.error, "creating conversation")?;

        let channel = result
            .channel
            .ok_or_else(|| SlackError::Response("conversations.create returned no channel".into()))?;

        debug!(channel_id = %channel.id, name = ?channel.name, "Conversation created");

        Ok(ChannelId::new(channel.id))
    }
}
