//! End-to-end lifecycle tests over a scripted fake engine.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use vigil_common::config::AppConfig;
use vigil_common::error::{EngineError, EngineResult, VigilError};
use vigil_engine::{EngineEvent, EngineOptions, EngineSession, MediaEngine};
use vigil_session::{
    drive, LifecycleRouter, LifecycleSignal, Notice, SessionState, StreamSession, StreamTarget,
};

#[derive(Default)]
struct FakeState {
    handles: Vec<FakeHandle>,
    fail_next_open: bool,
}

struct FakeHandle {
    target: String,
    sink: Option<PathBuf>,
    playing: bool,
    release_calls: u32,
}

/// Scripted engine: records every open and every handle operation so the
/// tests can audit resource accounting after the fact.
#[derive(Clone, Default)]
struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    fn fail_next_open(&self) {
        self.state.lock().unwrap().fail_next_open = true;
    }

    fn opens(&self) -> usize {
        self.state.lock().unwrap().handles.len()
    }

    fn target(&self, idx: usize) -> String {
        self.state.lock().unwrap().handles[idx].target.clone()
    }

    fn sink(&self, idx: usize) -> Option<PathBuf> {
        self.state.lock().unwrap().handles[idx].sink.clone()
    }

    fn is_playing(&self, idx: usize) -> bool {
        self.state.lock().unwrap().handles[idx].playing
    }

    fn release_calls(&self, idx: usize) -> u32 {
        self.state.lock().unwrap().handles[idx].release_calls
    }
}

impl MediaEngine for FakeEngine {
    fn open(
        &mut self,
        target: &str,
        options: &EngineOptions,
    ) -> EngineResult<Box<dyn EngineSession>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_open {
            state.fail_next_open = false;
            return Err(EngineError::open("scripted open failure"));
        }
        state.handles.push(FakeHandle {
            target: target.to_string(),
            sink: options.sink.as_ref().map(|s| s.path.clone()),
            playing: false,
            release_calls: 0,
        });
        let idx = state.handles.len() - 1;
        Ok(Box::new(FakeSession {
            idx,
            state: self.state.clone(),
        }))
    }
}

struct FakeSession {
    idx: usize,
    state: Arc<Mutex<FakeState>>,
}

impl EngineSession for FakeSession {
    fn play(&mut self) -> EngineResult<()> {
        self.state.lock().unwrap().handles[self.idx].playing = true;
        Ok(())
    }

    fn stop(&mut self) -> EngineResult<()> {
        self.state.lock().unwrap().handles[self.idx].playing = false;
        Ok(())
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.handles[self.idx].release_calls += 1;
        state.handles[self.idx].playing = false;
    }

    fn is_playing(&self) -> bool {
        self.state.lock().unwrap().handles[self.idx].playing
    }

    fn take_event(&mut self) -> Option<EngineEvent> {
        None
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.recordings_dir = std::env::temp_dir().join("vigil-lifecycle-tests");
    config
}

fn new_session(target: &str) -> (StreamSession, FakeEngine) {
    let engine = FakeEngine::default();
    let target = StreamTarget::parse(target).unwrap();
    let session = StreamSession::new(target, Box::new(engine.clone()), &test_config());
    (session, engine)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

#[test]
fn scenario_a_start_stream_from_idle() {
    let (mut session, engine) = new_session("rtsp://cam1");
    assert_eq!(session.state(), SessionState::Idle);

    session.start_stream().unwrap();

    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(session.live_generation().map(|g| g.value()), Some(1));
    assert_eq!(engine.opens(), 1);
    assert_eq!(engine.target(0), "rtsp://cam1");
    assert!(engine.is_playing(0));
    assert!(engine.sink(0).is_none());
}

#[test]
fn scenario_b_start_record_swaps_the_handle() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_record().unwrap();

    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.live_generation().map(|g| g.value()), Some(2));
    // prior generation released exactly once
    assert_eq!(engine.release_calls(0), 1);
    assert!(engine.sink(1).is_some());
    assert!(engine.is_playing(1));
    assert!(session.recording_sink().is_some());
}

#[test]
fn scenario_c_suspend_denied_while_recording() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_record().unwrap();
    let mut notices = session.subscribe_notices();

    session.suspend();

    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(engine.release_calls(1), 0);
    assert!(engine.is_playing(1));
    assert_eq!(drain(&mut notices), vec![Notice::PipDeniedWhileRecording]);
}

#[test]
fn scenario_d_suspend_retains_then_resume_reopens() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();

    session.suspend();
    assert_eq!(session.state(), SessionState::Suspended);
    // playback stopped, handle retained for resume
    assert!(!engine.is_playing(0));
    assert_eq!(engine.release_calls(0), 0);
    assert!(session.live_generation().is_some());

    session.resume().unwrap();
    assert_eq!(session.state(), SessionState::Streaming);
    // the reopen released the suspended handle and opened a fresh
    // generation for the same target
    assert_eq!(engine.release_calls(0), 1);
    assert_eq!(session.live_generation().map(|g| g.value()), Some(2));
    assert_eq!(engine.target(1), "rtsp://cam1");
}

#[test]
fn scenario_e_close_is_idempotent_with_exactly_one_release() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();

    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(engine.release_calls(0), 1);

    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(engine.release_calls(0), 1);
}

#[test]
fn scenario_f_empty_target_rejected_before_any_engine_call() {
    assert!(matches!(
        StreamTarget::parse(""),
        Err(VigilError::InvalidTarget { .. })
    ));
    assert!(matches!(
        StreamTarget::parse("  \t"),
        Err(VigilError::InvalidTarget { .. })
    ));
}

#[test]
fn record_round_trip_returns_to_streaming_with_fresh_handle() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_record().unwrap();
    session.stop_record().unwrap();

    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(session.target().as_str(), "rtsp://cam1");
    assert_eq!(engine.opens(), 3);
    // back on a live-display handle, not the recording handle
    assert!(engine.sink(2).is_none());
    assert_eq!(engine.target(2), "rtsp://cam1");
    assert_eq!(engine.release_calls(1), 1);
    assert_eq!(session.live_generation().map(|g| g.value()), Some(3));
    assert!(session.recording_sink().is_none());
}

#[test]
fn closed_is_terminal_for_every_request() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.close();
    let opens_at_close = engine.opens();

    session.start_stream().unwrap();
    session.start_record().unwrap();
    session.stop_record().unwrap();
    session.suspend();
    session.resume().unwrap();
    session.on_engine_error(EngineError::playback("late error"));

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(engine.opens(), opens_at_close);
    assert_eq!(engine.release_calls(0), 1);
}

#[test]
fn duplicate_suspend_is_idempotent() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();

    session.suspend();
    session.suspend();

    assert_eq!(session.state(), SessionState::Suspended);
    assert_eq!(engine.release_calls(0), 0);
    assert!(!engine.is_playing(0));
}

#[test]
fn duplicate_start_record_is_idempotent() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_record().unwrap();
    let sink = session.recording_sink().cloned();

    session.start_record().unwrap();

    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(engine.opens(), 2);
    assert_eq!(session.recording_sink().cloned(), sink);
}

#[test]
fn reentrant_start_stream_reopens_without_leaking() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_stream().unwrap();

    assert_eq!(session.state(), SessionState::Streaming);
    assert_eq!(engine.opens(), 2);
    assert_eq!(engine.release_calls(0), 1);
    assert_eq!(session.live_generation().map(|g| g.value()), Some(2));
}

#[test]
fn engine_error_releases_and_falls_back_to_idle() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    let mut notices = session.subscribe_notices();

    session.on_engine_error(EngineError::playback("connection reset"));

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(engine.release_calls(0), 1);
    assert!(session.live_generation().is_none());
    assert!(matches!(
        session.last_error(),
        Some(EngineError::Playback { .. })
    ));
    let notices = drain(&mut notices);
    assert!(matches!(notices.as_slice(), [Notice::EngineFailure { .. }]));
}

#[test]
fn open_failure_reports_upward_and_leaves_idle() {
    let (mut session, engine) = new_session("rtsp://cam1");
    engine.fail_next_open();

    let err = session.start_stream().unwrap_err();

    assert!(matches!(err, VigilError::Engine(_)));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(engine.opens(), 0);
    assert!(session.live_generation().is_none());
    assert!(matches!(
        session.last_error(),
        Some(EngineError::OpenFailure { .. })
    ));
}

#[test]
fn successful_transition_clears_last_error() {
    let (mut session, engine) = new_session("rtsp://cam1");
    engine.fail_next_open();
    session.start_stream().unwrap_err();
    assert!(session.last_error().is_some());

    session.start_stream().unwrap();
    assert!(session.last_error().is_none());
    assert_eq!(session.state(), SessionState::Streaming);
}

#[test]
fn status_snapshot_reflects_session() {
    let (mut session, _engine) = new_session("rtsp://cam1");
    session.set_pip_supported(false);
    session.start_stream().unwrap();
    session.start_record().unwrap();

    let status = session.status();
    assert_eq!(status.state, SessionState::Recording);
    assert_eq!(status.target, "rtsp://cam1");
    assert!(status.recording_sink.is_some());
    assert!(!status.pip_supported);
    assert!(status.last_error.is_none());
}

#[test]
fn router_maps_signals_to_transitions() {
    let (mut session, _engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    let mut router = LifecycleRouter::new();

    router.route(&mut session, LifecycleSignal::Background);
    assert_eq!(session.state(), SessionState::Suspended);

    router.route(&mut session, LifecycleSignal::Foreground);
    assert_eq!(session.state(), SessionState::Streaming);

    router.route(&mut session, LifecycleSignal::CloseRequested);
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn router_collapses_consecutive_duplicate_signals() {
    let (mut session, _engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    session.start_record().unwrap();
    let mut notices = session.subscribe_notices();
    let mut router = LifecycleRouter::new();

    router.route(&mut session, LifecycleSignal::PipRequested);
    router.route(&mut session, LifecycleSignal::PipRequested);

    // one denial notice, not two: the duplicate collapsed before the
    // state machine saw it
    assert_eq!(drain(&mut notices), vec![Notice::PipDeniedWhileRecording]);
    assert_eq!(session.state(), SessionState::Recording);
}

#[test]
fn duplicate_close_signal_is_a_no_op() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    let mut router = LifecycleRouter::new();

    router.route(&mut session, LifecycleSignal::CloseRequested);
    router.route(&mut session, LifecycleSignal::CloseRequested);
    router.route(&mut session, LifecycleSignal::Destroyed);

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(engine.release_calls(0), 1);
}

#[tokio::test]
async fn driver_applies_signals_in_arrival_order_until_close() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();
    let mut notices = session.subscribe_notices();

    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(drive(session, rx));

    tx.send(LifecycleSignal::Background).unwrap();
    tx.send(LifecycleSignal::Foreground).unwrap();
    tx.send(LifecycleSignal::CloseRequested).unwrap();

    let session = handle.await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    // suspend retained generation 1; resume opened generation 2; close
    // released it
    assert_eq!(engine.opens(), 2);
    assert_eq!(engine.release_calls(0), 1);
    assert_eq!(engine.release_calls(1), 1);

    let notices = drain(&mut notices);
    assert_eq!(
        notices,
        vec![
            Notice::StreamStopped,
            Notice::StreamStarted,
            Notice::SessionClosed,
        ]
    );
}

#[tokio::test]
async fn dropping_the_signal_sender_closes_the_session() {
    let (mut session, engine) = new_session("rtsp://cam1");
    session.start_stream().unwrap();

    let (tx, rx) = mpsc::unbounded_channel::<LifecycleSignal>();
    let handle = tokio::spawn(drive(session, rx));
    drop(tx);

    let session = handle.await.unwrap();
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(engine.release_calls(0), 1);
}
