//! The media-engine capability boundary.
//!
//! These traits are the seam between the session lifecycle code and the
//! concrete backend. The GStreamer implementation lives in [`crate::gst`];
//! tests drive the same traits with a scripted fake.

use vigil_common::error::{EngineError, EngineResult};

use crate::options::EngineOptions;

/// An asynchronous status event delivered by an open engine session.
///
/// Events are read-only status updates; errors are routed through the
/// session state machine's transition entry point like any other request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The stream ended on the remote side.
    EndOfStream,

    /// The engine failed mid-playback.
    Error(EngineError),
}

/// One open playback (and optionally recording) session with the engine.
///
/// The handle must be released exactly once; [`EngineSession::release`] is
/// idempotent so racing teardown paths stay safe.
pub trait EngineSession: Send {
    /// Begin playback.
    fn play(&mut self) -> EngineResult<()>;

    /// Stop playback. The handle stays valid and must still be released.
    /// For recording sessions this also finalizes the file sink.
    fn stop(&mut self) -> EngineResult<()>;

    /// Tear down the handle. Releasing an already-released handle is a
    /// no-op, never an error.
    fn release(&mut self);

    /// Whether playback is currently running.
    fn is_playing(&self) -> bool;

    /// Drain the next pending status event, if any. Never blocks.
    fn take_event(&mut self) -> Option<EngineEvent>;
}

/// The engine capability: open a session for a stream target with a fixed
/// per-mode option set.
pub trait MediaEngine: Send {
    fn open(
        &mut self,
        target: &str,
        options: &EngineOptions,
    ) -> EngineResult<Box<dyn EngineSession>>;
}
