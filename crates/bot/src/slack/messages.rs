//! Slack message builders for the gohan menu flow.
//!
//! Provides factory functions for:
//! - The ephemeral gohan selection menu
//! - The confirm/deny prompt that replaces the menu
//! - Plain text replies (start and completion notices, `check`, `reactions`)

use std::time::Duration;

use gohan_core::UserId;

use super::types::{ActionElement, Block, ButtonStyle, OptionObject, PlainText, Reaction, Text};

/// Block ID of the menu's actions block; routes to the selection step.
pub const SELECT_BLOCK_ID: &str = "select-item";

/// Block ID of the confirm/deny buttons; routes to the confirmation step.
pub const CONFIRM_BLOCK_ID: &str = "confirm-item";

/// Value carried by the deny button.
pub const DENY_VALUE: &str = "いいえ";

/// Fallback text for clients that cannot render blocks.
pub const FALLBACK_TEXT: &str = "This client is not supported.";

/// Reply to `ping`.
pub const PONG: &str = "pong";

/// The menu, in display order. Each option's value is its label.
pub const GOHAN_MENU: [&str; 5] = ["とんかつ", "お刺身", "ハンバーグ", "鯖味噌", "寿司"];

/// Build the ephemeral gohan selection menu.
///
/// The message contains:
/// - A prompt section
/// - A static select with every [`GOHAN_MENU`] entry, tagged [`SELECT_BLOCK_ID`]
#[must_use]
pub fn build_menu_message() -> Vec<Block> {
    let options = GOHAN_MENU.into_iter().map(OptionObject::same).collect();

    vec![
        Block::Section {
            text: Text::mrkdwn("Please select Gohan"),
        },
        Block::Actions {
            block_id: Some(SELECT_BLOCK_ID.to_string()),
            elements: vec![ActionElement::StaticSelect {
                placeholder: PlainText::new("Select Gohan"),
                action_id: "gohan-select".to_string(),
                options,
            }],
        },
    ]
}

/// Build the confirmation prompt that replaces the menu.
///
/// The confirm button carries `gohan`; the deny button carries [`DENY_VALUE`].
/// Both sit in a block tagged [`CONFIRM_BLOCK_ID`].
#[must_use]
pub fn build_confirm_prompt(gohan: &str) -> Vec<Block> {
    vec![
        Block::Section {
            text: Text::mrkdwn(format!("お前は{gohan}が食べたいのか？")),
        },
        Block::Actions {
            block_id: Some(CONFIRM_BLOCK_ID.to_string()),
            elements: vec![
                ActionElement::Button {
                    text: PlainText::new("食べたい"),
                    action_id: "gohan-confirm".to_string(),
                    value: Some(gohan.to_string()),
                    style: Some(ButtonStyle::Primary),
                },
                ActionElement::Button {
                    text: PlainText::new("いいえ"),
                    action_id: "gohan-deny".to_string(),
                    value: Some(DENY_VALUE.to_string()),
                    style: Some(ButtonStyle::Danger),
                },
            ],
        },
    ]
}

/// Notice posted when the confirmed gohan starts cooking.
///
/// Partial seconds round up, so a non-zero wait never reads as zero.
#[must_use]
pub fn cooking_started_text(user: &UserId, duration: Duration) -> String {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    format!("{} 了解しました. {secs}秒待つのです.", user.mention())
}

/// Notice posted when cooking is done.
#[must_use]
pub fn cooking_done_text(user: &UserId, gohan: &str) -> String {
    format!("{} の今日のご飯は `{gohan}` に決定しました", user.mention())
}

/// Delayed `check` nudge asking `reference` to run `reactions`.
#[must_use]
pub fn check_reminder_text(reference: &UserId, message_id: &str) -> String {
    format!("{} reactions {message_id}", reference.mention())
}

/// One line summarizing a reaction: its reactors and emoji.
#[must_use]
pub fn reaction_summary_text(reaction: &Reaction) -> String {
    format!("[{}] :{}:", reaction.users.join(" "), reaction.name)
}

/// Name of the throwaway channel created by `conversations`.
#[must_use]
pub fn temp_channel_name(unix_secs: u64) -> String {
    format!("temp-test-{unix_secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_option_in_order() {
        let blocks = build_menu_message();
        assert_eq!(blocks.len(), 2);

        let value = serde_json::to_value(&blocks).expect("serialize");
        let actions = &value[1];
        assert_eq!(actions["block_id"], SELECT_BLOCK_ID);

        let options = actions["elements"][0]["options"]
            .as_array()
            .expect("options array");
        let values: Vec<&str> = options
            .iter()
            .filter_map(|o| o["value"].as_str())
            .collect();
        assert_eq!(values, GOHAN_MENU);
    }

    #[test]
    fn test_confirm_prompt_has_confirm_and_deny() {
        let blocks = build_confirm_prompt("寿司");

        let Some(Block::Actions { block_id, elements }) = blocks.get(1) else {
            panic!("Expected Actions block");
        };
        assert_eq!(block_id.as_deref(), Some(CONFIRM_BLOCK_ID));
        assert_eq!(elements.len(), 2);

        let values: Vec<Option<&str>> = elements
            .iter()
            .map(|e| match e {
                ActionElement::Button { value, .. } => value.as_deref(),
                ActionElement::StaticSelect { .. } => None,
            })
            .collect();
        assert_eq!(values, [Some("寿司"), Some(DENY_VALUE)]);
    }

    #[test]
    fn test_prompt_text_names_selection() {
        let json = serde_json::to_string(&build_confirm_prompt("鯖味噌")).expect("serialize");
        assert!(json.contains("お前は鯖味噌が食べたいのか？"));
    }

    #[test]
    fn test_cooking_texts() {
        let user = UserId::new("U0USER");
        assert_eq!(
            cooking_started_text(&user, Duration::from_secs(10)),
            "<@U0USER> 了解しました. 10秒待つのです."
        );
        assert_eq!(
            cooking_started_text(&user, Duration::from_millis(10)),
            "<@U0USER> 了解しました. 1秒待つのです."
        );
        assert_eq!(
            cooking_started_text(&user, Duration::from_millis(2_500)),
            "<@U0USER> 了解しました. 3秒待つのです."
        );
        assert_eq!(
            cooking_started_text(&user, Duration::ZERO),
            "<@U0USER> 了解しました. 0秒待つのです."
        );
        assert_eq!(
            cooking_done_text(&user, "寿司"),
            "<@U0USER> の今日のご飯は `寿司` に決定しました"
        );
    }

    #[test]
    fn test_check_and_reaction_texts() {
        assert_eq!(
            check_reminder_text(&UserId::new("A017C1D07AR"), "1625097600123456"),
            "<@A017C1D07AR> reactions 1625097600123456"
        );

        let reaction = Reaction {
            name: "thumbsup".to_string(),
            users: vec!["U1".to_string(), "U2".to_string()],
            count: 2,
        };
        assert_eq!(reaction_summary_text(&reaction), "[U1 U2] :thumbsup:");
    }

    #[test]
    fn test_temp_channel_name() {
        assert_eq!(temp_channel_name(1_625_097_600), "temp-test-1625097600");
    }
}
