//! Server-side error types: boot failures and the HTTP mapping of
//! [`EventError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use canary_core::EventError;
use serde_json::json;
use std::io;
use thiserror::Error;

use crate::config::ErrorPosture;

pub const GENERIC_STORAGE_MESSAGE: &str = "internal storage error";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Storage(#[from] EventError),
}

/// An [`EventError`] on its way out as an HTTP response.
///
/// Client faults always carry their message. Storage faults only reveal
/// detail in development posture.
#[derive(Debug)]
pub struct ApiError {
    pub error: EventError,
    pub posture: ErrorPosture,
}

impl ApiError {
    pub fn new(error: EventError, posture: ErrorPosture) -> Self {
        Self { error, posture }
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            EventError::Validation(_) => StatusCode::BAD_REQUEST,
            EventError::NotFound { .. } => StatusCode::NOT_FOUND,
            EventError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match (&self.error, self.posture) {
            (EventError::Storage(_), ErrorPosture::Production) => {
                GENERIC_STORAGE_MESSAGE.to_string()
            }
            (e, _) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.error.is_client_fault() {
            tracing::error!("request failed: {}", self.error);
        }

        let body = Json(json!({
            "error": self.message(),
            "code": self.error.as_str(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let posture = ErrorPosture::Production;
        assert_eq!(
            ApiError::new(EventError::validation("x"), posture).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::new(EventError::not_found("abc"), posture).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::new(EventError::storage("disk full"), posture).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_storage_detail_hidden_in_production() {
        let err = ApiError::new(EventError::storage("disk I/O error"), ErrorPosture::Production);
        assert_eq!(err.message(), GENERIC_STORAGE_MESSAGE);

        let err = ApiError::new(EventError::storage("disk I/O error"), ErrorPosture::Development);
        assert_eq!(err.message(), "storage error: disk I/O error");
    }

    #[test]
    fn test_client_fault_messages_always_descriptive() {
        let err = ApiError::new(
            EventError::validation("endpoint is required"),
            ErrorPosture::Production,
        );
        assert_eq!(err.message(), "endpoint is required");

        let err = ApiError::new(EventError::not_found("e-1"), ErrorPosture::Production);
        assert_eq!(err.message(), "event e-1 not found");
    }
}
