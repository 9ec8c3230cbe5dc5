//! Handle-generation accounting.
//!
//! Every engine open is tagged with a fresh generation. A release carries
//! the generation it targets and is a no-op when that generation is no
//! longer the live one, so a delayed or duplicate release can never destroy
//! a handle opened afterwards.

use std::fmt;

/// Tag identifying one engine open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

/// Tracks which handle generation, if any, is currently live.
#[derive(Debug, Default)]
pub struct ResourceGuard {
    next: u64,
    live: Option<Generation>,
}

impl ResourceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the generation tag for an open that is about to happen.
    /// The tag stays dead until [`ResourceGuard::commit`] — an open that
    /// fails simply never commits its generation.
    pub fn begin_open(&mut self) -> Generation {
        self.next += 1;
        Generation(self.next)
    }

    /// Mark a generation live after its open resolved.
    pub fn commit(&mut self, generation: Generation) {
        if let Some(prior) = self.live {
            // The adapter releases before opening, so a live prior
            // generation here means a release was skipped.
            tracing::warn!(%prior, %generation, "Committing over a live generation");
        }
        self.live = Some(generation);
    }

    /// Release a generation. Returns `false` (and changes nothing) when the
    /// generation is stale: already released, superseded, or never
    /// committed.
    pub fn release(&mut self, generation: Generation) -> bool {
        if self.live == Some(generation) {
            self.live = None;
            true
        } else {
            tracing::debug!(%generation, "Ignoring release of stale generation");
            false
        }
    }

    /// The currently live generation, if any.
    pub fn live(&self) -> Option<Generation> {
        self.live
    }

    pub fn is_live(&self, generation: Generation) -> bool {
        self.live == Some(generation)
    }
}
