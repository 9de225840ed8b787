//! Webhook bodies shaped like the ones Slack delivers.
//!
//! Pass the output to `gohan-cli sign --body` to get matching headers.

use serde_json::json;

/// A `url_verification` handshake body.
#[must_use]
pub fn challenge(token: &str) -> String {
    json!({
        "token": "local",
        "challenge": token,
        "type": "url_verification",
    })
    .to_string()
}

/// An `event_callback` body wrapping an `app_mention`.
#[must_use]
pub fn mention(text: &str, channel: &str, user: &str) -> String {
    json!({
        "type": "event_callback",
        "event": {
            "type": "app_mention",
            "user": user,
            "text": text,
            "ts": "1625097600.000100",
            "channel": channel,
        },
    })
    .to_string()
}

/// A form-encoded `block_actions` body with a single action.
///
/// `select-item` actions carry the value as the selected option, every
/// other block as a button value.
#[must_use]
pub fn action(
    block_id: &str,
    value: &str,
    response_url: &str,
    channel: &str,
    user: &str,
) -> String {
    let element = if block_id == "select-item" {
        json!({
            "type": "static_select",
            "action_id": "gohan-select",
            "block_id": block_id,
            "selected_option": {"text": {"type": "plain_text", "text": value}, "value": value},
        })
    } else {
        json!({
            "type": "button",
            "action_id": "gohan-confirm",
            "block_id": block_id,
            "value": value,
        })
    };

    let payload = json!({
        "type": "block_actions",
        "user": {"id": user},
        "channel": {"id": channel},
        "container": {"type": "message", "channel_id": channel},
        "response_url": response_url,
        "actions": [element],
    });

    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", &payload.to_string())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_body() {
        let value: serde_json::Value = serde_json::from_str(&challenge("abc123")).expect("json");
        assert_eq!(value["type"], "url_verification");
        assert_eq!(value["challenge"], "abc123");
    }

    #[test]
    fn test_mention_body() {
        let value: serde_json::Value =
            serde_json::from_str(&mention("<@U0BOT> ping", "C1", "U1")).expect("json");
        assert_eq!(value["event"]["type"], "app_mention");
        assert_eq!(value["event"]["text"], "<@U0BOT> ping");
        assert_eq!(value["event"]["channel"], "C1");
    }

    #[test]
    fn test_action_body_is_form_encoded() {
        let body = action("select-item", "寿司", "https://example.test/r", "C1", "U1");
        assert!(body.starts_with("payload="));

        let (_, json) = url::form_urlencoded::parse(body.as_bytes())
            .find(|(key, _)| key == "payload")
            .expect("payload field");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["actions"][0]["selected_option"]["value"], "寿司");
    }
}
