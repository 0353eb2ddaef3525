//! Error types for LexDraft.
//!
//! Library crates use [`LexDraftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::ConversationId;

/// Top-level error type for all LexDraft operations.
#[derive(Debug, thiserror::Error)]
pub enum LexDraftError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Knowledge retrieval degraded (sidecar unreachable, load or query failed).
    /// Never fatal to a turn; the orchestrator proceeds without context.
    #[error("retrieval degraded: {0}")]
    Retrieval(String),

    /// The generation collaborator failed. Fatal to the turn.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The generation collaborator did not answer in time. Fatal to the turn.
    #[error("generation timed out after {limit:?}")]
    GenerationTimeout { limit: Duration },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persistence collaborator has no conversation with this id.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Request or data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LexDraftError>;

impl LexDraftError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error ends the current turn (as opposed to degrading it).
    pub fn is_fatal_to_turn(&self) -> bool {
        matches!(
            self,
            Self::Generation(_) | Self::GenerationTimeout { .. } | Self::Validation { .. }
        )
    }
}
