use serde::Serialize;
use axum::Json;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::models::ResultStatus;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: ResultStatus,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: String) -> Self {
        ErrorBody {
            status: ResultStatus::Error,
            message,
        }
    }
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorBody>) {
    (status, Json(ErrorBody::new(message)))
}

/// A fully rendered file the client should download rather than display.
pub fn attachment(bytes: Vec<u8>, filename: &str, content_type: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename={}", filename)),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attachment_sets_download_headers() {
        let response = attachment(b"%PDF-1.3".to_vec(), "out.pdf", "application/pdf");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=out.pdf"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.3");
    }

    #[test]
    fn error_body_shape() {
        let (status, Json(body)) = error(StatusCode::BAD_REQUEST, "No URL provided".to_string());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "status": "error", "message": "No URL provided" })
        );
    }
}
