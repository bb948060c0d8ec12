//! Error types for the dashboard engine.
//!
//! Uses `thiserror` for typed errors that surface through the engine
//! binary: configuration loading and change-source connectivity.

use crate::config::ConfigError;
use crate::source::SourceError;

/// Errors that can occur during dashboard engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration is invalid or could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The change notification source failed.
    #[error("change source error: {0}")]
    Source(#[from] SourceError),
}
