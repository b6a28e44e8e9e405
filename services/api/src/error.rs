//! services/api/src/error.rs
//!
//! Defines the primary error type for the service binary, and the error body
//! every handler answers with.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quiz_core::{ExportError, ExtractionError, PipelineError};
use serde::Serialize;
use std::error::Error as StdError;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

//=========================================================================================
// Handler Errors
//=========================================================================================

/// The JSON body of every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// The top-level message, suitable for display.
    pub error: String,
    /// The chain of underlying causes, outermost first.
    pub details: Vec<String>,
}

/// An error leaving a handler: a status code plus the full cause chain.
#[derive(Debug)]
pub struct HandlerError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl HandlerError {
    pub fn new(status: StatusCode, error: &(dyn StdError + 'static)) -> Self {
        let mut details = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            details.push(cause.to_string());
            source = cause.source();
        }
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                details,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: Vec::new(),
            },
        }
    }
}

impl From<PipelineError> for HandlerError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::MissingInput(_) | PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PipelineError::Extraction(ExtractionError::UnsupportedFormat { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::GenerationFailure { .. } => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, &err)
    }
}

impl From<ExportError> for HandlerError {
    fn from(err: ExportError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, &err)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
