//! The session state machine.
//!
//! One `StreamSession` owns one stream target and the single engine
//! handle behind it. All mutation goes through the transition methods
//! here; there are no free-floating "is recording" flags, the `state`
//! field is the only authority.
//!
//! Transition methods take `&mut self` and must be invoked under a
//! single-writer discipline — in practice the owning task in
//! [`crate::router::drive`], or a mutex-guarded wrapper.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::mpsc;
use vigil_common::config::AppConfig;
use vigil_common::error::{EngineError, VigilResult};
use vigil_engine::{EngineAdapter, EngineEvent, Generation, MediaEngine};

use crate::notice::{Notice, StatusSnapshot};
use crate::sink::resolve_sink_path;
use crate::target::StreamTarget;

/// What is currently happening. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No engine handle held.
    Idle,
    /// Live display running.
    Streaming,
    /// Simultaneous display and file output running.
    Recording,
    /// Playback stopped for PIP/background; handle retained for resume.
    Suspended,
    /// Torn down. No transition leaves this state.
    Closed,
}

/// The single owned unit of work: one target, one engine handle, one
/// authoritative state.
pub struct StreamSession {
    target: StreamTarget,
    state: SessionState,
    adapter: EngineAdapter,
    recordings_dir: PathBuf,
    recording_sink: Option<PathBuf>,
    last_error: Option<EngineError>,
    pip_supported: bool,
    notices: Option<mpsc::UnboundedSender<Notice>>,
}

impl StreamSession {
    /// Create a session in `Idle`. No engine interaction happens until the
    /// first `start_stream`.
    pub fn new(target: StreamTarget, engine: Box<dyn MediaEngine>, config: &AppConfig) -> Self {
        Self {
            target,
            state: SessionState::Idle,
            adapter: EngineAdapter::new(engine, config.stream.clone()),
            recordings_dir: config.recordings_dir.clone(),
            recording_sink: None,
            last_error: None,
            pip_supported: true,
            notices: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }

    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// Sink of the in-progress recording, if any.
    pub fn recording_sink(&self) -> Option<&PathBuf> {
        self.recording_sink.as_ref()
    }

    /// Generation of the live engine handle, if any.
    pub fn live_generation(&self) -> Option<Generation> {
        self.adapter.live_generation()
    }

    /// Record whether the platform supports picture-in-picture. Only
    /// reflected in the status snapshot; transitions are unaffected.
    pub fn set_pip_supported(&mut self, supported: bool) {
        self.pip_supported = supported;
    }

    /// Subscribe to transition notices. The previous subscriber, if any,
    /// stops receiving.
    pub fn subscribe_notices(&mut self) -> mpsc::UnboundedReceiver<Notice> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notices = Some(tx);
        rx
    }

    /// Point-in-time status for the UI layer.
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            target: self.target.to_string(),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
            recording_sink: self.recording_sink.clone(),
            pip_supported: self.pip_supported,
        }
    }

    /// Begin (or re-begin) live display.
    ///
    /// From `Idle` this is the ordinary open. From `Streaming` it is the
    /// re-entrant case: the prior handle is stopped and released inside
    /// the adapter before the reopen, so nothing leaks.
    pub fn start_stream(&mut self) -> VigilResult<()> {
        match self.state {
            SessionState::Idle | SessionState::Streaming => {
                match self.adapter.open_for_streaming(self.target.as_str()) {
                    Ok(generation) => {
                        tracing::info!(url = %self.target, %generation, "Streaming started");
                        self.commit(SessionState::Streaming, Notice::StreamStarted);
                        Ok(())
                    }
                    Err(e) => self.engine_failure(e),
                }
            }
            _ => self.ignore("start-stream"),
        }
    }

    /// Switch from live display to simultaneous display + MP4 recording.
    /// Idempotent while already `Recording`.
    pub fn start_record(&mut self) -> VigilResult<()> {
        match self.state {
            SessionState::Streaming => {
                // Resolved before the engine is involved; a failure here
                // leaves the live stream untouched.
                let sink = resolve_sink_path(&self.recordings_dir)?;
                match self
                    .adapter
                    .open_for_recording(self.target.as_str(), &sink)
                {
                    Ok(generation) => {
                        tracing::info!(sink = %sink.display(), %generation, "Recording started");
                        self.commit(
                            SessionState::Recording,
                            Notice::RecordingStarted { sink: sink.clone() },
                        );
                        self.recording_sink = Some(sink);
                        Ok(())
                    }
                    Err(e) => self.engine_failure(e),
                }
            }
            _ => self.ignore("start-record"),
        }
    }

    /// End recording and resume plain live display. The recording handle
    /// is released (finalizing the file) by the streaming reopen.
    pub fn stop_record(&mut self) -> VigilResult<()> {
        match self.state {
            SessionState::Recording => {
                let sink = self.recording_sink.take();
                match self.adapter.open_for_streaming(self.target.as_str()) {
                    Ok(generation) => {
                        tracing::info!(%generation, "Recording stopped, streaming resumed");
                        self.commit(SessionState::Streaming, Notice::RecordingStopped { sink });
                        Ok(())
                    }
                    Err(e) => self.engine_failure(e),
                }
            }
            _ => self.ignore("stop-record"),
        }
    }

    /// Stop playback for PIP entry or background, retaining the handle.
    ///
    /// Recording in progress takes precedence: the request is denied, the
    /// session stays in `Recording`, and the denial is surfaced as a
    /// notice rather than silently swallowed.
    pub fn suspend(&mut self) {
        match self.state {
            SessionState::Streaming => {
                self.adapter.stop();
                self.state = SessionState::Suspended;
                tracing::info!("Session suspended");
                self.notify(Notice::StreamStopped);
            }
            SessionState::Recording => {
                tracing::info!("Suspend denied: recording in progress");
                self.notify(Notice::PipDeniedWhileRecording);
            }
            _ => {
                let _ = self.ignore("suspend");
            }
        }
    }

    /// Resume live display after a suspend. Reopens a fresh handle for
    /// the same target; the retained suspended handle is released by the
    /// reopen.
    pub fn resume(&mut self) -> VigilResult<()> {
        match self.state {
            SessionState::Suspended => {
                match self.adapter.open_for_streaming(self.target.as_str()) {
                    Ok(generation) => {
                        tracing::info!(%generation, "Session resumed");
                        self.commit(SessionState::Streaming, Notice::StreamStarted);
                        Ok(())
                    }
                    Err(e) => self.engine_failure(e),
                }
            }
            _ => self.ignore("resume"),
        }
    }

    /// Tear the session down: stop-then-release, exactly once, then
    /// `Closed`. Idempotent; `Closed` is terminal.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            tracing::debug!("Ignoring close: session already closed");
            return;
        }
        self.adapter.release_live();
        self.state = SessionState::Closed;
        self.recording_sink = None;
        tracing::info!("Session closed");
        self.notify(Notice::SessionClosed);
    }

    /// Route an asynchronous engine failure through the same transition
    /// entry point as any other request: release the handle, remember the
    /// error, fall back to `Idle`. Ignored once closed.
    pub fn on_engine_error(&mut self, error: EngineError) {
        if self.state == SessionState::Closed {
            return;
        }
        tracing::warn!(%error, "Engine reported failure");
        let _ = self.engine_failure(error);
    }

    /// Drain pending engine events. Errors feed `on_engine_error`; other
    /// events are read-only status updates.
    pub fn poll_engine(&mut self) {
        while let Some(event) = self.adapter.take_event() {
            match event {
                EngineEvent::Error(e) => {
                    self.on_engine_error(e);
                    return;
                }
                EngineEvent::EndOfStream => {
                    tracing::info!(url = %self.target, "Engine reported end of stream");
                }
            }
        }
    }

    fn commit(&mut self, state: SessionState, notice: Notice) {
        self.state = state;
        self.last_error = None;
        if state != SessionState::Recording {
            self.recording_sink = None;
        }
        self.notify(notice);
    }

    fn engine_failure(&mut self, error: EngineError) -> VigilResult<()> {
        self.adapter.release_live();
        self.last_error = Some(error.clone());
        self.state = SessionState::Idle;
        self.recording_sink = None;
        self.notify(Notice::EngineFailure {
            reason: error.to_string(),
        });
        Err(error.into())
    }

    /// A transition not defined for the current state is a no-op, not a
    /// failure — lifecycle signals arrive duplicated and late.
    fn ignore(&self, request: &str) -> VigilResult<()> {
        tracing::debug!(request, state = ?self.state, "Ignoring transition not defined for state");
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(notice = %notice, "Transition notice");
        if let Some(tx) = &self.notices {
            tx.send(notice).ok();
        }
    }
}
