//! Interaction payloads from the interactivity endpoint.
//!
//! Slack posts interactions as `application/x-www-form-urlencoded` with a
//! single `payload` field holding JSON. Only `block_actions` payloads are
//! handled; other kinds decode to [`InteractionPayload::Other`].

use gohan_core::{ChannelId, UserId};
use serde::Deserialize;

use super::error::SlackError;
use super::signature::VerifiedBody;

/// Interaction payload, keyed by interaction kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    /// A button click or menu selection inside a message.
    BlockActions(BlockActionsPayload),

    /// Shortcuts, view submissions and other kinds - ignored.
    #[serde(other)]
    Other,
}

impl InteractionPayload {
    /// Decode the `payload` field of an authenticated form body.
    ///
    /// # Errors
    ///
    /// Returns [`SlackError::InvalidPayload`] if the form has no `payload`
    /// field or its JSON does not decode.
    pub fn from_form(body: &VerifiedBody) -> Result<Self, SlackError> {
        let payload = url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "payload")
            .map(|(_, value)| value)
            .ok_or_else(|| SlackError::InvalidPayload("missing payload field".to_string()))?;

        serde_json::from_str(&payload).map_err(|e| SlackError::InvalidPayload(e.to_string()))
    }
}

/// A `block_actions` interaction.
#[derive(Debug, Deserialize)]
pub struct BlockActionsPayload {
    /// User who triggered the interaction.
    pub user: InteractionUser,
    /// Channel where the interaction occurred.
    #[serde(default)]
    pub channel: Option<InteractionChannel>,
    /// Container of the interactive message.
    #[serde(default)]
    pub container: Option<InteractionContainer>,
    /// Short-lived URL for replacing the interactive message.
    #[serde(default)]
    pub response_url: Option<String>,
    /// Actions that were triggered.
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: UserId,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
}

/// Channel where interaction occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    /// Channel ID.
    pub id: ChannelId,
    /// Channel name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Container for the interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionContainer {
    /// Container type (e.g., "message").
    #[serde(rename = "type")]
    pub container_type: String,
    /// Channel ID.
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
}

/// An action element as delivered by Slack.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    /// Action ID of the element.
    #[serde(default)]
    pub action_id: String,
    /// Block ID of the actions block containing the element.
    #[serde(default)]
    pub block_id: String,
    /// Value attached to a button.
    #[serde(default)]
    pub value: Option<String>,
    /// Option chosen in a select menu.
    #[serde(default)]
    pub selected_option: Option<SelectedOption>,
    /// Element type (`button`, `static_select`, ...).
    #[serde(rename = "type", default)]
    pub action_type: String,
}

/// The chosen option of a select menu.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOption {
    /// The option's value.
    pub value: String,
}

/// A `block_actions` interaction narrowed to its first action.
///
/// Constructing one proves the payload carried at least one action.
#[derive(Debug, Clone)]
pub struct BlockAction {
    /// Block ID used for routing.
    pub block_id: String,
    /// Selected option value, or the button value.
    pub value: Option<String>,
    /// Response URL for replacing the original message.
    pub response_url: Option<String>,
    /// User who triggered the action.
    pub user: UserId,
    /// Channel the action happened in.
    pub channel: Option<ChannelId>,
}

impl TryFrom<BlockActionsPayload> for BlockAction {
    type Error = SlackError;

    fn try_from(payload: BlockActionsPayload) -> Result<Self, Self::Error> {
        let action = payload
            .actions
            .into_iter()
            .next()
            .ok_or_else(|| SlackError::InvalidPayload("no actions in payload".to_string()))?;

        let value = action
            .selected_option
            .map(|option| option.value)
            .or(action.value);

        let channel = payload
            .channel
            .map(|c| c.id)
            .or_else(|| payload.container.and_then(|c| c.channel_id));

        Ok(Self {
            block_id: action.block_id,
            value,
            response_url: payload.response_url,
            user: payload.user.id,
            channel,
        })
    }
}
