//! Recording sink path policy.

use std::path::{Path, PathBuf};

use vigil_common::error::VigilResult;

/// Resolve a fresh output path for a recording about to start.
///
/// Names are millisecond-timestamp derived, so every recording gets a
/// path of its own; a sink path is never reused across recordings. The
/// directory is created if missing, and a failure here surfaces before
/// the engine is ever involved.
pub fn resolve_sink_path(recordings_dir: &Path) -> VigilResult<PathBuf> {
    std::fs::create_dir_all(recordings_dir)?;
    let stamp = chrono::Utc::now().timestamp_millis();
    Ok(recordings_dir.join(format!("{stamp}.mp4")))
}
