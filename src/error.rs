use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Failed to fetch the website: {0}")]
    FetchError(String),

    #[error("Failed to generate PDF: {0}")]
    RenderError(String),

    #[error("An unexpected error occurred: {0}")]
    UnexpectedError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::FetchError(_)
            | AppError::RenderError(_)
            | AppError::UnexpectedError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status_code(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

impl From<crate::pdf::PdfError> for AppError {
    fn from(err: crate::pdf::PdfError) -> Self {
        AppError::RenderError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_bad_request() {
        let err = AppError::ValidationError("No URL provided".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No URL provided");
    }

    #[test]
    fn failures_map_to_internal_server_error() {
        for err in [
            AppError::FetchError("connection refused".to_string()),
            AppError::RenderError("unclosed tag".to_string()),
            AppError::UnexpectedError("boom".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn messages_carry_their_prefix() {
        assert_eq!(
            AppError::FetchError("timed out".to_string()).to_string(),
            "Failed to fetch the website: timed out"
        );
        assert_eq!(
            AppError::RenderError("bad markup".to_string()).to_string(),
            "Failed to generate PDF: bad markup"
        );
    }

    #[tokio::test]
    async fn into_response_uses_error_body() {
        let response = AppError::ValidationError("No URL provided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "No URL provided");
    }
}
