//! HTTP middleware stack for the bot.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Slack signature verification (webhook routes only)

pub mod request_id;
pub mod slack_signature;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use slack_signature::{MAX_BODY_BYTES, verify_slack_request};
