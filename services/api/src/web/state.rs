//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use quiz_core::CompletionClientProvider;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// It holds no per-request data; each quiz run owns its document and credential.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub completion_provider: Arc<dyn CompletionClientProvider>,
}
