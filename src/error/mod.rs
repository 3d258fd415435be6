//! Error types for sessionfold.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Rejected before any stream consumption begins.
    #[error("{0}")]
    Validation(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid message on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Agent process exited with {status}: {stderr}")]
    Process { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SessionError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a stream error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InvalidArgument(_) => ErrorCategory::Validation,
            Self::Stream(_) | Self::Decode { .. } => ErrorCategory::Stream,
            Self::Process { .. } => ErrorCategory::Process,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether a caller could reasonably try the same item again.
    ///
    /// Nothing inside this crate acts on it; a run is consumed exactly once.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Stream | ErrorCategory::Process | ErrorCategory::Io
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Validation => RecoverySuggestion::FixInput,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Process => RecoverySuggestion::CheckAgentInstallation,
            ErrorCategory::Stream | ErrorCategory::Io => RecoverySuggestion::EnableDebug,
            ErrorCategory::Serialization => RecoverySuggestion::ReportProtocolMismatch,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SessionError>;

/// A batch aborted on its first failing item.
#[derive(Error, Debug)]
#[error("Item {item_index} failed: {source}")]
pub struct BatchError {
    pub item_index: usize,
    #[source]
    pub source: SessionError,
}
