//! Lifecycle signal routing.
//!
//! External asynchronous signals (backgrounding, PIP, close requests,
//! destruction) become transition requests here. Signals are processed
//! strictly in arrival order; consecutive duplicates collapse into a
//! single attempt, which the state machine treats as idempotent anyway.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::session::{SessionState, StreamSession};

/// An external lifecycle signal. Carries no payload: what to do is fully
/// determined by the signal kind and the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// The surrounding application moved to the background.
    Background,
    /// The surrounding application returned to the foreground.
    Foreground,
    /// The user requested picture-in-picture.
    PipRequested,
    /// Out-of-band close request (e.g. from a PIP overlay control).
    CloseRequested,
    /// The owning context is being destroyed.
    Destroyed,
}

/// Maps lifecycle signals onto session transitions.
#[derive(Debug, Default)]
pub struct LifecycleRouter {
    last: Option<LifecycleSignal>,
}

impl LifecycleRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one signal to the session. Must be called from the session's
    /// single writer.
    pub fn route(&mut self, session: &mut StreamSession, signal: LifecycleSignal) {
        if self.last == Some(signal) {
            tracing::debug!(?signal, "Collapsing duplicate lifecycle signal");
            return;
        }
        self.last = Some(signal);

        match signal {
            LifecycleSignal::Background | LifecycleSignal::PipRequested => session.suspend(),
            LifecycleSignal::Foreground => {
                if let Err(e) = session.resume() {
                    tracing::warn!(error = %e, "Resume failed");
                }
            }
            LifecycleSignal::CloseRequested | LifecycleSignal::Destroyed => session.close(),
        }
    }
}

/// How often the driver polls the engine for asynchronous events between
/// lifecycle signals.
const ENGINE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Own the session until it closes.
///
/// This task is the single-writer gate: every transition — lifecycle
/// signal or engine failure — is applied here, in the order accepted.
/// Returns the closed session for final inspection. Dropping the signal
/// sender closes the session.
pub async fn drive(
    mut session: StreamSession,
    mut signals: mpsc::UnboundedReceiver<LifecycleSignal>,
) -> StreamSession {
    let mut router = LifecycleRouter::new();
    let mut poll = tokio::time::interval(ENGINE_POLL_INTERVAL);
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(signal) => {
                    tracing::debug!(?signal, "Lifecycle signal received");
                    router.route(&mut session, signal);
                    if session.state() == SessionState::Closed {
                        break;
                    }
                }
                None => {
                    tracing::debug!("Signal channel closed; closing session");
                    session.close();
                    break;
                }
            },
            _ = poll.tick() => {
                session.poll_engine();
            }
        }
    }

    session
}
