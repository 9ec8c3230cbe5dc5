//! Status surface exposed to the UI layer.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::session::SessionState;

/// Toast-style notice emitted on each completed transition (and on the
/// one deliberately denied transition: PIP while recording).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    StreamStarted,
    StreamStopped,
    RecordingStarted { sink: PathBuf },
    RecordingStopped { sink: Option<PathBuf> },
    /// Recording in progress takes precedence over suspend; the denial is
    /// surfaced instead of silently swallowed.
    PipDeniedWhileRecording,
    EngineFailure { reason: String },
    SessionClosed,
}

impl Notice {
    /// Human-readable message for the UI toast.
    pub fn message(&self) -> String {
        match self {
            Notice::StreamStarted => "Stream started".to_string(),
            Notice::StreamStopped => "Stream stopped".to_string(),
            Notice::RecordingStarted { sink } => {
                format!("Recording started: {}", sink.display())
            }
            Notice::RecordingStopped { sink: Some(sink) } => {
                format!("Recording stopped: {}", sink.display())
            }
            Notice::RecordingStopped { sink: None } => "Recording stopped".to_string(),
            Notice::PipDeniedWhileRecording => {
                "Recording in progress; picture-in-picture is unavailable".to_string()
            }
            Notice::EngineFailure { reason } => format!("Stream error: {reason}"),
            Notice::SessionClosed => "Stream closed".to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Point-in-time view of the session for the UI layer.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: SessionState,
    pub target: String,
    pub last_error: Option<String>,
    pub recording_sink: Option<PathBuf>,
    /// Whether the platform supports picture-in-picture. Consulted only by
    /// callers; the state machine has a single suspend transition either
    /// way.
    pub pip_supported: bool,
}
