//! Error types shared across Vigil crates.

/// Top-level error type for Vigil operations.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// Empty or malformed stream target, rejected before any engine
    /// interaction.
    #[error("Invalid stream target: {reason}")]
    InvalidTarget { reason: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VigilError.
pub type VigilResult<T> = Result<T, VigilError>;

impl VigilError {
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

/// Failures surfaced at the media-engine boundary.
///
/// Engine failures are caught at the adapter and converted into this
/// taxonomy before reaching the session state machine; raw backend errors
/// never cross it. A release against a stale handle generation is not an
/// error at all (it is a guarded no-op), so it has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine rejected an open (bad URL, unreachable server, codec
    /// init failure). Not retried automatically.
    #[error("Engine open failed: {reason}")]
    OpenFailure { reason: String },

    /// The engine failed after a successful open.
    #[error("Engine playback failed: {reason}")]
    Playback { reason: String },
}

impl EngineError {
    pub fn open(reason: impl Into<String>) -> Self {
        Self::OpenFailure {
            reason: reason.into(),
        }
    }

    pub fn playback(reason: impl Into<String>) -> Self {
        Self::Playback {
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine-boundary operations.
pub type EngineResult<T> = Result<T, EngineError>;
