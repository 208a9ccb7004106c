//! Error types for the RecoServe engine
//!
//! This module provides the error hierarchy for the service:
//! - `thiserror` for ergonomic error definitions
//! - Domain-specific error variants for actionable error handling
//! - HTTP status code mapping for API responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Result type alias for RecoServe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the RecoServe engine
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Configuration error: {message}")]
    Config {
        message: Cow<'static, str>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: &'static str },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig {
        key: &'static str,
        message: Cow<'static, str>,
    },

    // ========================================================================
    // Artifact Errors
    // ========================================================================
    #[error("Artifact error: {message}")]
    Artifact {
        message: Cow<'static, str>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // API Errors
    // ========================================================================
    #[error("Unauthorized: {message}")]
    Unauthorized { message: Cow<'static, str> },

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    // ========================================================================
    // Recommendation Errors
    // ========================================================================
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: Cow<'static, str> },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Internal server error")]
    Internal {
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    // ========================================================================
    // Constructors for common error patterns
    // ========================================================================

    /// Create a configuration error
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create an artifact error
    pub fn artifact(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Artifact {
            message: message.into(),
            source: None,
        }
    }

    /// Create an artifact error with an I/O source
    pub fn artifact_with_source(
        message: impl Into<Cow<'static, str>>,
        source: std::io::Error,
    ) -> Self {
        Self::Artifact {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal {
            source: Some(Box::new(source)),
        }
    }

    // ========================================================================
    // Error Classification
    // ========================================================================

    /// Returns true if this error should be logged at error level
    pub fn is_error_level(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::Artifact { .. }
                | Error::Csv(_)
                | Error::Json(_)
                | Error::Internal { .. }
                | Error::Other(_)
        )
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Error::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } | Error::MissingEnvVar { .. } | Error::InvalidConfig { .. } => {
                "CONFIG_ERROR"
            }
            Error::Artifact { .. } => "ARTIFACT_ERROR",
            Error::Csv(_) | Error::Json(_) => "SERIALIZATION_ERROR",
            Error::Unauthorized { .. } => "UNAUTHORIZED",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Error::Internal { .. } | Error::Other(_) => "INTERNAL_ERROR",
        }
    }
}

// ============================================================================
// Error Response for API
// ============================================================================

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        // Don't expose internal error details in production
        let safe_message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            message
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: safe_message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

// ============================================================================
// From implementations for external error types
// ============================================================================

impl From<std::env::VarError> for Error {
    fn from(_err: std::env::VarError) -> Self {
        Error::Config {
            message: "Environment variable error".into(),
            source: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Artifact {
            message: err.to_string().into(),
            source: Some(err),
        }
    }
}
