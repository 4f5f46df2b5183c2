use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use showcase_shared::ValidationError;

use crate::gateway::GatewayError;
use crate::image_store::ImageStoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Malformed form data: {0}")]
    MalformedForm(String),

    #[error("Image encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Remote asset upload failed: {0}")]
    RemoteAssetUploadFailed(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::MalformedForm(_) => StatusCode::BAD_REQUEST,
            ServerError::EncodingFailed(_)
            | ServerError::RemoteAssetUploadFailed(_)
            | ServerError::Persistence(_)
            | ServerError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ImageStoreError> for ServerError {
    fn from(e: ImageStoreError) -> Self {
        match e {
            ImageStoreError::Encoding(msg) => ServerError::EncodingFailed(msg),
            ImageStoreError::Remote(msg) => ServerError::RemoteAssetUploadFailed(msg),
            ImageStoreError::Timeout => ServerError::Timeout("remote asset service"),
        }
    }
}

impl From<GatewayError> for ServerError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Timeout => ServerError::Timeout("document store"),
            other => ServerError::Persistence(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Dependency failures are logged where they happen; callers only get a
        // generic message.
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_400() {
        let err = ServerError::from(ValidationError::InvalidPrice("-1".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid price '-1': must be a non-negative number");
        assert_eq!(
            ServerError::MalformedForm("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_dependency_errors_are_500() {
        for err in [
            ServerError::from(ImageStoreError::Encoding("x".into())),
            ServerError::from(ImageStoreError::Remote("x".into())),
            ServerError::from(ImageStoreError::Timeout),
            ServerError::from(GatewayError::Timeout),
            ServerError::from(GatewayError::Unavailable("x".into())),
        ] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_error_kinds_map_distinctly() {
        assert!(matches!(
            ServerError::from(ImageStoreError::Remote("503".into())),
            ServerError::RemoteAssetUploadFailed(_)
        ));
        assert!(matches!(
            ServerError::from(ImageStoreError::Timeout),
            ServerError::Timeout("remote asset service")
        ));
        assert!(matches!(
            ServerError::from(GatewayError::Timeout),
            ServerError::Timeout("document store")
        ));
        assert!(matches!(
            ServerError::from(GatewayError::Unavailable("down".into())),
            ServerError::Persistence(_)
        ));
    }

    #[tokio::test]
    async fn test_server_error_body_hides_details() {
        let response = ServerError::Persistence("disk I/O error at /var/db".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_client_error_body_carries_message() {
        let response = ServerError::from(ValidationError::MissingField("price")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing required field: price");
    }
}
