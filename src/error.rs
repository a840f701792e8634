use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::translation::TranslationError;
use crate::upload::{ImageValidationError, UploadError};

pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// The one place errors become HTTP responses. Every body is `{status: "error", message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad user input, 400.
    #[error("{0}")]
    BadRequest(String),

    /// An upstream provider failed, 500 with a message safe to show the user.
    #[error("{0}")]
    Upstream(String),

    /// Anything else, 500. `public_message` is what the client sees and must
    /// stay generic; `detail` is only logged.
    #[error("{public_message}: {detail}")]
    Unexpected {
        public_message: &'static str,
        detail: anyhow::Error,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unexpected(public_message: &'static str, detail: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected {
            public_message,
            detail: detail.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(m) | Self::Upstream(m) => m.clone(),
            Self::Unexpected { public_message, .. } => public_message.to_string(),
        }
    }
}

impl From<ImageValidationError> for ApiError {
    fn from(e: ImageValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Invalid(invalid) => invalid.into(),
            UploadError::Io(io) => {
                Self::unexpected("An unexpected error occurred during translation", io)
            }
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(e: TranslationError) -> Self {
        Self::Upstream(format!("Translation failed: {}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Unexpected {
            public_message,
            detail,
        } = &self
        {
            error!("{}: {:#}", public_message, detail);
        }
        error_response(self.status(), &self.client_message())
    }
}

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(TranslationError::EmptyMenu).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(UploadError::Invalid(ImageValidationError::EmptyContent)).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unexpected_hides_detail() {
        let err = ApiError::unexpected(
            UNEXPECTED_MESSAGE,
            std::io::Error::new(std::io::ErrorKind::Other, "disk on fire at /secret/path"),
        );
        assert_eq!(err.client_message(), UNEXPECTED_MESSAGE);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unexpected_body_carries_public_message_only() {
        let response = ApiError::unexpected(
            "An unexpected error occurred during translation",
            std::io::Error::new(std::io::ErrorKind::Other, "disk on fire at /secret/path"),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "status": "error",
                "message": "An unexpected error occurred during translation"
            })
        );
    }

    #[test]
    fn test_translation_error_message() {
        let err = ApiError::from(TranslationError::EmptyMenu);
        assert_eq!(
            err.client_message(),
            "Translation failed: no dishes were recognized on the menu"
        );
    }
}
