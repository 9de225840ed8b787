//! Slack Block Kit types and Web API response types.
//!
//! These types represent the subset of the Slack Block Kit specification
//! needed for the gohan menu and its confirmation prompt.
//!
//! See: <https://api.slack.com/block-kit>

use serde::{Deserialize, Serialize};

/// A plain text channel message (`chat.postMessage`).
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    /// Channel ID to post to.
    pub channel: String,
    /// Message body.
    pub text: String,
}

/// An ephemeral message visible only to `user` (`chat.postEphemeral`).
#[derive(Debug, Clone, Serialize)]
pub struct EphemeralMessage {
    /// Channel ID to post in.
    pub channel: String,
    /// The only user who will see the message.
    pub user: String,
    /// Fallback text.
    pub text: String,
    /// Message blocks.
    pub blocks: Vec<Block>,
}

/// Body posted to an interaction `response_url`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseUrlMessage {
    /// Replace the message the interaction came from.
    pub replace_original: bool,
    /// Fallback text.
    pub text: String,
    /// Message blocks.
    pub blocks: Vec<Block>,
}

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section block with text.
    Section { text: Text },
    /// Actions block with interactive elements.
    ///
    /// `block_id` comes back in interaction payloads and drives routing.
    Actions {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<ActionElement>,
    },
}

/// Section text object.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Plain text object (for button labels, placeholders and options).
#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// An option in a select menu.
#[derive(Debug, Clone, Serialize)]
pub struct OptionObject {
    /// Label shown to the user.
    pub text: PlainText,
    /// Value sent back when the option is chosen.
    pub value: String,
}

impl OptionObject {
    /// Create an option whose value and label are the same string.
    #[must_use]
    pub fn same(value: &str) -> Self {
        Self {
            text: PlainText::new(value),
            value: value.to_string(),
        }
    }
}

/// Interactive elements for action blocks and section accessories.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    /// Interactive button.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
    /// Select menu with a fixed option list.
    StaticSelect {
        placeholder: PlainText,
        action_id: String,
        options: Vec<OptionObject>,
    },
}

/// Button style (affects color).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Green primary button.
    Primary,
    /// Red danger button.
    Danger,
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from posting a message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where message was posted.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from posting an ephemeral message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostEphemeralResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Timestamp of the ephemeral message.
    #[serde(default)]
    pub message_ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `reactions.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionsResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// The message (or file) the reactions belong to.
    #[serde(default)]
    pub message: Option<ReactedItem>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// The item returned by `reactions.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactedItem {
    /// Reactions on the item; absent when there are none.
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

/// A single emoji reaction and who added it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Emoji name without colons.
    pub name: String,
    /// User IDs of the reactors.
    #[serde(default)]
    pub users: Vec<String>,
    /// Total reaction count (may exceed `users.len()` for large sets).
    #[serde(default)]
    pub count: u32,
}

/// Response from `conversations.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationsCreateResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// The created channel.
    #[serde(default)]
    pub channel: Option<CreatedChannel>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Channel returned by `conversations.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedChannel {
    /// Channel ID.
    pub id: String,
    /// Channel name.
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actions_block_serializes_block_id() {
        let block = Block::Actions {
            block_id: Some("select-item".to_string()),
            elements: vec![ActionElement::StaticSelect {
                placeholder: PlainText::new("Select Gohan"),
                action_id: "gohan-select".to_string(),
                options: vec![OptionObject::same("寿司")],
            }],
        };

        let value = serde_json::to_value(&block).expect("serialize");
        assert_eq!(value["type"], "actions");
        assert_eq!(value["block_id"], "select-item");
        assert_eq!(value["elements"][0]["type"], "static_select");
        assert_eq!(value["elements"][0]["options"][0]["value"], "寿司");
        assert_eq!(value["elements"][0]["options"][0]["text"]["type"], "plain_text");
    }

    #[test]
    fn test_section_and_message_shapes() {
        let section = Block::Section {
            text: Text::mrkdwn("Please select Gohan"),
        };
        assert_eq!(
            serde_json::to_value(&section).expect("serialize"),
            json!({"type": "section", "text": {"type": "mrkdwn", "text": "Please select Gohan"}})
        );

        let message = SlackMessage {
            channel: "C0CHAN".to_string(),
            text: "pong".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).expect("serialize"),
            json!({"channel": "C0CHAN", "text": "pong"})
        );
    }

    #[test]
    fn test_button_omits_missing_fields() {
        let button = ActionElement::Button {
            text: PlainText::new("OK"),
            action_id: "ok".to_string(),
            value: None,
            style: None,
        };

        let value = serde_json::to_value(&button).expect("serialize");
        assert_eq!(value, json!({
            "type": "button",
            "text": {"type": "plain_text", "text": "OK", "emoji": true},
            "action_id": "ok",
        }));
    }

    #[test]
    fn test_reactions_response_defaults() {
        let response: ReactionsResponse = serde_json::from_value(json!({
            "ok": true,
            "type": "message",
            "message": {"type": "message", "text": "hi"}
        }))
        .expect("deserialize");

        assert!(response.ok);
        assert!(response.message.expect("message").reactions.is_empty());
    }

    #[test]
    fn test_reactions_response_with_reactions() {
        let response: ReactionsResponse = serde_json::from_value(json!({
            "ok": true,
            "message": {
                "reactions": [
                    {"name": "thumbsup", "users": ["U1", "U2"], "count": 2}
                ]
            }
        }))
        .expect("deserialize");

        let reactions = response.message.expect("message").reactions;
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions.first().map(|r| r.name.as_str()), Some("thumbsup"));
    }
}
