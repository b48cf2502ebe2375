//! Error types for nsigdec

use thiserror::Error;

/// Main error type for nsigdec operations
#[derive(Debug, Error)]
pub enum NsigError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Transform engine '{engine}' failed: {reason}")]
    EngineFailure { engine: String, reason: String },

    #[error("Transform engine '{engine}' is incompatible: {reason}")]
    EngineIncompatible { engine: String, reason: String },

    #[error("Invocation already completed")]
    AlreadyRun,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl NsigError {
    /// Build an engine failure for the named engine
    pub fn engine_failure(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        NsigError::EngineFailure {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Build an incompatibility error for the named engine
    pub fn engine_incompatible(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        NsigError::EngineIncompatible {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            NsigError::InvalidArguments(_) => 2,
            NsigError::EngineIncompatible { .. } => 3,
            NsigError::EngineFailure { .. } | NsigError::AlreadyRun | NsigError::IoError(_) => 1,
        }
    }

    /// Check if the error originated in the transform engine
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            NsigError::EngineFailure { .. } | NsigError::EngineIncompatible { .. }
        )
    }
}
