//! Slack request authentication.
//!
//! Buffers the body once, verifies it against the signing secret, and hands
//! the same buffer both to the handler (as a [`VerifiedBody`] extension) and
//! back into the request. Unauthenticated requests never reach a handler.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::slack::VerifiedBody;
use crate::state::AppState;

/// Largest body accepted on the signed routes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Middleware that rejects requests not signed by Slack.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if the body cannot be read or exceeds
/// [`MAX_BODY_BYTES`], and [`AppError::Unauthorized`] if verification fails.
pub async fn verify_slack_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {e}")))?;

    // Bytes is reference counted; hashing and forwarding share one buffer
    let verified = state.verifier().verify(&parts.headers, bytes.clone())?;

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(verified);

    Ok(next.run(request).await)
}

/// Extractor for the body proven authentic by [`verify_slack_request`].
///
/// # Example
///
/// ```ignore
/// async fn handler(body: VerifiedBody) -> impl IntoResponse {
///     body.as_bytes().len().to_string()
/// }
/// ```
impl<S> FromRequestParts<S> for VerifiedBody
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            warn!("Verified body not found in request extensions - middleware may be misconfigured");
            StatusCode::UNAUTHORIZED
        })
    }
}
