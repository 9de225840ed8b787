//! HTTP route handlers for the bot.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health     - Liveness check (unsigned)
//!
//! # Slack webhooks (signature verified)
//! POST /events     - Events API: url_verification, app_mention
//! POST /actions    - Interactivity: block_actions
//! ```

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::verify_slack_request;
use crate::state::AppState;

pub mod actions;
pub mod events;

/// Build the application routes.
///
/// The webhook routes sit behind [`verify_slack_request`]; `/health` does not.
pub fn routes(state: AppState) -> Router<AppState> {
    let webhooks = Router::new()
        .route("/events", post(events::handle_event))
        .route("/actions", post(actions::handle_action))
        .route_layer(middleware::from_fn_with_state(state, verify_slack_request));

    Router::new().route("/health", get(health)).merge(webhooks)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
