//! crates/quiz_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the edge of the core.
//! The LLM provider sits behind these traits so the pipeline never depends on a
//! particular HTTP client or vendor.

use crate::domain::ApiCredential;
use async_trait::async_trait;
use std::sync::Arc;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A generic error type for all port operations.
/// This abstracts away the specific errors of the remote provider (network, auth, quota).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("The remote completion call failed")]
    Remote(#[source] BoxError),
    #[error("The completion response contained no text content (model: {model})")]
    EmptyCompletion { model: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote LLM, seen as two opaque prompt-in, text-out calls.
///
/// Neither call retries nor validates what comes back.
#[async_trait]
pub trait QuizCompletionService: Send + Sync {
    /// Sends the rendered quiz-generation prompt and returns the raw completion.
    async fn complete_quiz(&self, prompt: &str) -> PortResult<String>;

    /// Sends the rendered review prompt and returns the raw completion.
    async fn complete_review(&self, prompt: &str) -> PortResult<String>;
}

/// Builds a completion client for the credential submitted with a request.
pub trait CompletionClientProvider: Send + Sync {
    fn connect(&self, credential: &ApiCredential) -> PortResult<Arc<dyn QuizCompletionService>>;
}
