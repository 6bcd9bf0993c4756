//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Collection, DocumentId, StoreError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "student not found: stu-42",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 503 Unavailable |
/// | 3000–3999 | Server / Store  | 500 / 502                    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Student with the given ID was not found.
    #[error("student not found: {0}")]
    StudentNotFound(DocumentId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown viewer role string.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// No snapshot has been delivered for the collection yet.
    #[error("{0} view not ready: no snapshot received yet")]
    NotReady(Collection),

    /// The document store rejected the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRole(_) => 1002,
            Self::StudentNotFound(_) => 2001,
            Self::NotReady(_) => 2003,
            Self::Store(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidRole(_) => StatusCode::BAD_REQUEST,
            Self::StudentNotFound(_) => StatusCode::NOT_FOUND,
            Self::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a store error on a student document, turning a missing document
    /// into [`GatewayError::StudentNotFound`].
    #[must_use]
    pub fn from_student_lookup(err: StoreError) -> Self {
        match err {
            StoreError::DocumentNotFound { id, .. } => Self::StudentNotFound(id),
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let details = match &self {
            Self::Store(err) => serde_json::to_string(err).ok(),
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses() {
        let err = GatewayError::StudentNotFound(DocumentId::new("s1"));
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = GatewayError::NotReady(Collection::Students);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("students"));
    }

    #[test]
    fn missing_student_document_maps_to_not_found() {
        let err = GatewayError::from_student_lookup(StoreError::DocumentNotFound {
            collection: Collection::Students,
            id: DocumentId::new("s9"),
        });
        assert!(matches!(err, GatewayError::StudentNotFound(_)));

        let err = GatewayError::from_student_lookup(StoreError::PermissionDenied(
            Collection::Students,
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn into_response_sets_status() {
        let response = GatewayError::InvalidRole("janitor".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
