//! Interactivity webhook handler.
//!
//! Handles menu selections and button clicks from the gohan flow.

use axum::{extract::State, http::StatusCode};
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::slack::{BlockAction, InteractionPayload, VerifiedBody};
use crate::state::AppState;

/// Handle an interaction delivery.
///
/// Non-`block_actions` interactions are acknowledged and ignored. A
/// `block_actions` payload without actions is a bad request.
#[instrument(skip(state, body))]
pub async fn handle_action(
    State(state): State<AppState>,
    body: VerifiedBody,
) -> Result<StatusCode, AppError> {
    let InteractionPayload::BlockActions(payload) = InteractionPayload::from_form(&body)? else {
        debug!("Ignoring non block_actions interaction");
        return Ok(StatusCode::OK);
    };

    let action = BlockAction::try_from(payload)?;
    let transition = state.interactions().handle(action).await?;
    debug!(?transition, "Interaction handled");

    Ok(StatusCode::OK)
}
