//! Unified error handling for the bot.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gohan_core::{CommandError, MessageTsError};
use thiserror::Error;

use crate::services::SchedulerError;
use crate::slack::{SignatureError, SlackError};

/// Application-level error type for webhook handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed Slack signature verification.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] SignatureError),

    /// Malformed or semantically invalid request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A Slack Web API call failed.
    #[error("Slack error: {0}")]
    Slack(SlackError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SlackError> for AppError {
    fn from(err: SlackError) -> Self {
        match err {
            SlackError::InvalidPayload(msg) => Self::BadRequest(msg),
            other => Self::Slack(other),
        }
    }
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<MessageTsError> for AppError {
    fn from(err: MessageTsError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<SchedulerError> for AppError {
    fn from(err: SchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Slack(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Webhook request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected webhook request");
        }

        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Slack(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't tell callers why authentication failed or what broke inside
        let message = match &self {
            Self::Unauthorized(_) => "Unauthorized".to_string(),
            Self::Slack(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::BadRequest(_) => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::from(SignatureError::Mismatch);
        assert_eq!(err.to_string(), "Unauthorized: signature mismatch");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::from(SignatureError::StaleTimestamp)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Slack(SlackError::Api("channel_not_found".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(
            AppError::from(SlackError::InvalidPayload("bad json".to_string())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(SlackError::Request("timeout".to_string())),
            AppError::Slack(_)
        ));
        assert!(matches!(
            AppError::from(CommandError::MissingName),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(MessageTsError::NotNumeric),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(SchedulerError::ShutDown),
            AppError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_body_is_generic() {
        let response = AppError::from(SignatureError::Mismatch).into_response();
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body");
        assert_eq!(&body[..], b"Unauthorized");
    }
}
