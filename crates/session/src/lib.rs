//! Vigil Session Core
//!
//! Owns the lifecycle of exactly one stream session: what is currently
//! happening (idle / streaming / recording / suspended / closed), which
//! transitions are legal, and when the single engine handle is opened,
//! stopped, and released.
//!
//! # Architecture
//!
//! ```text
//! external signal ──▶ LifecycleRouter ──▶ StreamSession ──▶ EngineAdapter
//!   (background,        (dedup, strict      (validates &       (opens /
//!    PIP, close,         arrival order)      commits state)     releases)
//!    destroy)                                     │
//!                                                 ▼
//!                                          Notice channel ──▶ UI layer
//! ```
//!
//! All transitions flow through one owning task ([`router::drive`]), so
//! state reads and writes are single-writer by construction.

pub mod notice;
pub mod router;
pub mod session;
pub mod sink;
pub mod target;

pub use notice::*;
pub use router::*;
pub use session::*;
pub use target::*;
