//! Error handling
//!
//! Application error taxonomy and its mapping onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::UserId;
use crate::validation::ValidationError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Input outside its declared range or not parseable
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No profile has been created for this user yet
    #[error("no profile for user {0}")]
    ProfileNotFound(UserId),

    /// External collaborator returned a non-success answer or was unreachable
    #[error("provider error: {0}")]
    Provider(String),

    /// Provider answered but knows nothing about the query
    #[error("nothing found for '{0}'")]
    NoMatch(String),

    /// External collaborator did not answer in time
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("io error: {0}")]
    Io(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure came from an external collaborator
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AppError::Provider(_) | AppError::NoMatch(_) | AppError::Timeout(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout(e.to_string())
        } else if e.is_decode() {
            AppError::Serialization(e.to_string())
        } else {
            AppError::Provider(e.to_string())
        }
    }
}

/// Axum response implementation for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = (&self).into();
        let mut body = ErrorResponse::new(&code, &self.to_string());
        if let AppError::Validation(err) = &self {
            body = body.with_details(err.field().name());
        }
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body),
        )
            .into_response()
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Details
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

/// HTTP status mapping
impl From<&AppError> for (u16, String) {
    fn from(err: &AppError) -> (u16, String) {
        match err {
            AppError::ProfileNotFound(_) => (404, "NOT_FOUND".to_string()),
            AppError::NoMatch(_) => (404, "NO_MATCH".to_string()),
            AppError::Validation(_) => (400, "BAD_REQUEST".to_string()),
            AppError::Provider(_) => (502, "PROVIDER_ERROR".to_string()),
            AppError::Timeout(_) => (504, "TIMEOUT".to_string()),
            _ => (500, "INTERNAL_ERROR".to_string()),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, AppError>;
