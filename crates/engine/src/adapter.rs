//! Uniform open/stop/release surface over the media engine.
//!
//! The adapter owns the single live engine handle. Every open first
//! releases whatever handle is held, so at most one handle is live at any
//! time no matter how callers interleave mode switches.

use std::path::Path;

use vigil_common::config::StreamTuning;
use vigil_common::error::EngineResult;

use crate::engine::{EngineEvent, EngineSession, MediaEngine};
use crate::guard::{Generation, ResourceGuard};
use crate::options::EngineOptions;

struct LiveHandle {
    generation: Generation,
    session: Box<dyn EngineSession>,
}

pub struct EngineAdapter {
    engine: Box<dyn MediaEngine>,
    guard: ResourceGuard,
    live: Option<LiveHandle>,
    tuning: StreamTuning,
}

impl EngineAdapter {
    pub fn new(engine: Box<dyn MediaEngine>, tuning: StreamTuning) -> Self {
        Self {
            engine,
            guard: ResourceGuard::new(),
            live: None,
            tuning,
        }
    }

    /// Open the engine for low-latency live display.
    pub fn open_for_streaming(&mut self, target: &str) -> EngineResult<Generation> {
        let options = EngineOptions::streaming(&self.tuning);
        self.open(target, options)
    }

    /// Open the engine duplicating output to display and an MP4 file sink.
    /// `sink_path` must already be resolved by the caller.
    pub fn open_for_recording(&mut self, target: &str, sink_path: &Path) -> EngineResult<Generation> {
        let options = EngineOptions::recording(&self.tuning, sink_path.to_path_buf());
        self.open(target, options)
    }

    fn open(&mut self, target: &str, options: EngineOptions) -> EngineResult<Generation> {
        // At-most-one-live-handle: the previous handle goes away before the
        // new open, whatever mode it was in.
        self.release_live();

        let generation = self.guard.begin_open();
        let mut session = self.engine.open(target, &options)?;
        if let Err(e) = session.play() {
            // The generation was never committed, so nothing to release in
            // the guard; the engine-side resource still goes away.
            session.release();
            return Err(e);
        }
        self.guard.commit(generation);
        tracing::info!(
            %generation,
            recording = options.is_recording(),
            "Engine handle opened"
        );
        self.live = Some(LiveHandle {
            generation,
            session,
        });
        Ok(generation)
    }

    /// Stop playback on the live handle. The handle is retained (and still
    /// live in guard terms) until released or superseded.
    pub fn stop(&mut self) {
        if let Some(handle) = &mut self.live {
            if let Err(e) = handle.session.stop() {
                tracing::warn!(generation = %handle.generation, error = %e, "Engine stop failed");
            }
        }
    }

    /// Release a specific generation. Stale generations (already released
    /// or superseded) are ignored without touching the live handle.
    pub fn release(&mut self, generation: Generation) {
        if !self.guard.release(generation) {
            return;
        }
        if let Some(mut handle) = self.live.take() {
            handle.session.release();
            tracing::info!(%generation, "Engine handle released");
        }
    }

    /// Release whatever handle is live, if any. Recording handles are
    /// stopped first so the file sink finalizes.
    pub fn release_live(&mut self) {
        if let Some(generation) = self.guard.live() {
            self.stop();
            self.release(generation);
        }
    }

    /// Generation of the live handle, if any.
    pub fn live_generation(&self) -> Option<Generation> {
        self.guard.live()
    }

    /// Whether the live handle is currently playing.
    pub fn is_playing(&self) -> bool {
        self.live.as_ref().is_some_and(|h| h.session.is_playing())
    }

    /// Drain the next pending engine event from the live handle.
    pub fn take_event(&mut self) -> Option<EngineEvent> {
        self.live.as_mut()?.session.take_event()
    }
}

impl Drop for EngineAdapter {
    fn drop(&mut self) {
        self.release_live();
    }
}
