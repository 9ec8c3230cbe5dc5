//! Vigil Media Engine
//!
//! The engine boundary for RTSP playback and recording. Everything above
//! this crate treats the media engine as an opaque capability: open a
//! session for a target URL with a fixed per-mode option set, play it,
//! stop it, release it exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                EngineAdapter                  │
//! │  open_for_streaming / open_for_recording      │
//! │  stop / release            ┌───────────────┐ │
//! │        │                   │ ResourceGuard │ │
//! │        ▼                   │ (generations) │ │
//! │  ┌───────────────┐         └───────────────┘ │
//! │  │ MediaEngine   │                            │
//! │  │ (GStreamer)   │──▶ display [+ MP4 file]    │
//! │  └───────────────┘                            │
//! └──────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod engine;
pub mod gst;
pub mod guard;
pub mod options;

pub use adapter::*;
pub use engine::*;
pub use guard::*;
pub use options::*;

pub use gst::GstEngine;
