//! Validated stream target.

use std::fmt;

use vigil_common::error::{VigilError, VigilResult};

/// The RTSP source identifier, set once at session creation and immutable
/// thereafter. Parsing rejects empty targets before any engine
/// interaction; whether the URL actually resolves is the engine's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget(String);

impl StreamTarget {
    pub fn parse(raw: &str) -> VigilResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VigilError::invalid_target("stream target is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
