//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::{NoContext, Timestamp, Uuid};

use crate::response::ApiResponse;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request-level failures.
///
/// The client only ever sees the variant's message; the source error is
/// logged with an error id and never written to the response body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{name} is required")]
    MissingParam { name: &'static str },

    #[error("{message}")]
    Unprocessable {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{message}")]
    BadRequest {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{message}")]
    NotFound { message: String },
}

impl AppError {
    /// Create a missing path parameter error
    pub fn missing_param(name: &'static str) -> Self {
        Self::MissingParam { name }
    }

    /// Create an unprocessable body error
    pub fn unprocessable(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Unprocessable {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::BadRequest {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // A missing path id is reported as 500.
            AppError::MissingParam { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn cause(&self) -> Option<&BoxError> {
        match self {
            AppError::Unprocessable { source, .. } | AppError::BadRequest { source, .. } => {
                Some(source)
            }
            AppError::MissingParam { .. } | AppError::NotFound { .. } => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v7(Timestamp::now(NoContext));
        let status = self.status();

        match self.cause() {
            Some(cause) => tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error.message = %self,
                error.cause = %cause,
                "Request error"
            ),
            None => tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error.message = %self,
                "Request error"
            ),
        }

        (status, Json(ApiResponse::message(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_param_mapping() {
        let response = AppError::missing_param("ID").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "message": "ID is required" }));
    }

    #[tokio::test]
    async fn test_source_is_not_exposed() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "relation does not exist");
        let response = AppError::bad_request("Could not get books", source).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Could not get books" })
        );
    }

    #[test]
    fn test_unprocessable_mapping() {
        let error = AppError::unprocessable("Request failed", "expected value at line 1");
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.to_string(), "Request failed");
    }

    #[test]
    fn test_not_found_mapping() {
        let response = AppError::not_found("Route not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
