//! Events API webhook handler.
//!
//! Answers the `url_verification` handshake and dispatches `app_mention`
//! events to the command dispatcher.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::slack::{EventEnvelope, InnerEvent, VerifiedBody};
use crate::state::AppState;

/// Handle an Events API delivery.
///
/// The handshake is answered with the challenge as `text/plain`. Callbacks
/// return an empty `200` once handled; unrecognized inner events are
/// acknowledged so Slack does not retry them.
#[instrument(skip(state, body))]
pub async fn handle_event(
    State(state): State<AppState>,
    body: VerifiedBody,
) -> Result<Response, AppError> {
    match EventEnvelope::parse(&body)? {
        EventEnvelope::UrlVerification { challenge } => {
            info!("Answering url_verification handshake");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                challenge,
            )
                .into_response())
        }
        EventEnvelope::EventCallback {
            event: InnerEvent::AppMention(mention),
        } => {
            let outcome = state.dispatcher().dispatch(&mention).await?;
            debug!(?outcome, "Mention handled");
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::EventCallback {
            event: InnerEvent::Unknown,
        } => {
            debug!("Ignoring unhandled event type");
            Ok(StatusCode::OK.into_response())
        }
    }
}
