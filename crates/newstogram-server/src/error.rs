//! HTTP-facing errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Parameter 'url' is required.")]
    MissingUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Could not fetch content from that URL.")]
    PageFetch(String),
    #[error("Could not download the image.")]
    ImageFetch(String),
    #[error("Translation failed: {0}")]
    Llm(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl(_) | ApiError::PageFetch(_) => StatusCode::BAD_REQUEST,
            ApiError::ImageFetch(_) | ApiError::Llm(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::PageFetch(detail) | ApiError::ImageFetch(detail) => {
                tracing::warn!("{}: {}", self, detail);
            }
            _ => tracing::warn!("{}", self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingUrl.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::PageFetch("404".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ImageFetch("timeout".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Llm("no choices".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::MissingUrl.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
