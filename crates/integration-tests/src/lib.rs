//! Integration tests for the gohan bot.
//!
//! Requests go through the full router (signature middleware, handlers,
//! services) via `tower::ServiceExt::oneshot`. Slack is replaced by a
//! [`RecordingMessenger`] and background workflows by a
//! [`CollectingLauncher`], so tests can inspect every outbound call.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gohan-integration-tests
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use gohan_bot::services::{CollectingLauncher, DispatcherSettings};
use gohan_bot::slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, sign};
use gohan_bot::slack::testing::RecordingMessenger;
use gohan_bot::slack::{Reaction, SignatureVerifier};
use gohan_bot::state::AppState;
use secrecy::SecretString;
use serde_json::json;
use tower::ServiceExt;

/// Signing secret shared by the test app and the request helpers.
pub const SIGNING_SECRET: &str = "8f3a9c1e7b2d4f6a0c5e9b1d3f7a2c4e";

/// Cooking wait used by the test app.
pub const COOKING_DURATION: Duration = Duration::from_millis(10);

/// Check delay used by the test app.
pub const CHECK_DELAY: Duration = Duration::from_millis(50);

/// The router plus handles on its test doubles.
pub struct TestApp {
    /// Full application router.
    pub router: Router,
    /// Application state behind the router.
    pub state: AppState,
    /// Records outbound Slack calls.
    pub messenger: Arc<RecordingMessenger>,
    /// Holds launched workflows until [`CollectingLauncher::run_all`].
    pub launcher: Arc<CollectingLauncher>,
}

impl TestApp {
    /// Build an app with default dispatcher settings and no reactions.
    #[must_use]
    pub fn new() -> Self {
        Self::with(RecordingMessenger::new(), DispatcherSettings::default())
    }

    /// Build an app whose messenger reports `reactions` for any message.
    #[must_use]
    pub fn with_reactions(reactions: Vec<Reaction>) -> Self {
        Self::with(
            RecordingMessenger::new().with_reactions(reactions),
            DispatcherSettings::default(),
        )
    }

    /// Build an app from a messenger and dispatcher settings.
    #[must_use]
    pub fn with(messenger: RecordingMessenger, settings: DispatcherSettings) -> Self {
        let messenger = Arc::new(messenger);
        let launcher = Arc::new(CollectingLauncher::new());
        let settings = DispatcherSettings {
            check_delay: CHECK_DELAY,
            ..settings
        };

        let state = AppState::from_parts(
            SignatureVerifier::new(SecretString::from(SIGNING_SECRET)),
            messenger.clone(),
            launcher.clone(),
            settings,
            COOKING_DURATION,
        );

        Self {
            router: gohan_bot::app(state.clone()),
            state,
            messenger,
            launcher,
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router fails to produce a response.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a signed Events API body.
    pub async fn post_event(&self, body: &serde_json::Value) -> Response<Body> {
        self.oneshot(signed_request("/events", "application/json", body.to_string()))
            .await
    }

    /// Send a signed interaction with `payload` form-encoded.
    pub async fn post_action(&self, payload: &serde_json::Value) -> Response<Body> {
        self.oneshot(signed_request(
            "/actions",
            "application/x-www-form-urlencoded",
            form_payload(payload),
        ))
        .await
    }

    /// Send a signed `app_mention` with `text`.
    pub async fn mention(&self, text: &str) -> Response<Body> {
        self.post_event(&mention_event(text)).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Current unix time as a header value.
///
/// # Panics
///
/// Panics if the system clock is before the unix epoch.
#[must_use]
pub fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs()
        .to_string()
}

/// A POST request signed with [`SIGNING_SECRET`] at the current time.
#[must_use]
pub fn signed_request(path: &str, content_type: &str, body: String) -> Request<Body> {
    signed_request_at(path, content_type, body, &now_timestamp())
}

/// A POST request signed with [`SIGNING_SECRET`] at `timestamp`.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn signed_request_at(
    path: &str,
    content_type: &str,
    body: String,
    timestamp: &str,
) -> Request<Body> {
    let signature = sign(SIGNING_SECRET, timestamp, body.as_bytes());

    Request::post(path)
        .header(header::CONTENT_TYPE, content_type)
        .header(TIMESTAMP_HEADER, timestamp)
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .expect("valid request")
}

/// Form-encode `payload` the way Slack sends interactions.
#[must_use]
pub fn form_payload(payload: &serde_json::Value) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", &payload.to_string())
        .finish()
}

/// An `event_callback` envelope wrapping an `app_mention` with `text`.
#[must_use]
pub fn mention_event(text: &str) -> serde_json::Value {
    json!({
        "type": "event_callback",
        "team_id": "T0TEAM",
        "event": {
            "type": "app_mention",
            "user": "U0USER",
            "text": text,
            "ts": "1625097600.000100",
            "channel": "C0CHAN",
            "event_ts": "1625097600.000100"
        }
    })
}

/// A `block_actions` payload with one action.
///
/// `selected` puts the value in `selected_option` (a menu); otherwise it is
/// a button value.
#[must_use]
pub fn block_actions(block_id: &str, value: &str, selected: bool) -> serde_json::Value {
    let action = if selected {
        json!({
            "type": "static_select",
            "action_id": "gohan-select",
            "block_id": block_id,
            "selected_option": {"text": {"type": "plain_text", "text": value}, "value": value}
        })
    } else {
        json!({
            "type": "button",
            "action_id": "gohan-confirm",
            "block_id": block_id,
            "value": value
        })
    };

    json!({
        "type": "block_actions",
        "user": {"id": "U0USER", "username": "taro"},
        "channel": {"id": "C0CHAN", "name": "general"},
        "container": {"type": "message", "channel_id": "C0CHAN"},
        "response_url": "https://hooks.slack.com/actions/T0TEAM/1/abc",
        "actions": [action]
    })
}

/// Read a response body as UTF-8.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Assert a status, showing the body on failure.
///
/// # Panics
///
/// Panics if the status differs.
pub async fn assert_status(response: Response<Body>, expected: StatusCode) -> String {
    let status = response.status();
    let body = body_string(response).await;
    assert_eq!(status, expected, "unexpected status, body: {body}");
    body
}
