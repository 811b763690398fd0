//! Explicit range selection for partial track reads.
//!
//! A [`ReadRange`] carries an optional start, an optional stop, and a step
//! (default 1). It is resolved against the live element count of a track
//! into concrete clamped bounds before any byte is read:
//!
//! - `start` and `stop` are clamped into `[0, count]`.
//! - An omitted `start` means the beginning, an omitted `stop` means the
//!   element count (the actual count, not a sentinel).
//! - `start >= count` resolves to an empty selection. Out-of-range reads
//!   are a clamping success path, never an error.
//!
//! The selected elements are those at `start`, `start + step`,
//! `start + 2*step`, ... strictly below `stop`.

use std::num::NonZeroUsize;

/// Step value of 1, the default.
const STEP_ONE: NonZeroUsize = NonZeroUsize::MIN;

/// A `(start, stop, step)` selector over a track's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRange {
    /// First selected index; `None` means the beginning.
    pub start: Option<usize>,
    /// Exclusive upper bound; `None` means the element count.
    pub stop: Option<usize>,
    /// Distance between selected indexes; at least 1.
    pub step: NonZeroUsize,
}

/// A [`ReadRange`] resolved against a concrete element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedRange {
    /// First selected index, clamped into `[0, count]`.
    pub start: usize,
    /// Exclusive upper bound, clamped into `[start, count]`.
    pub stop: usize,
    /// Distance between selected indexes.
    pub step: usize,
}

impl ReadRange {
    /// Select every element.
    pub const fn all() -> ReadRange {
        ReadRange {
            start: None,
            stop: None,
            step: STEP_ONE,
        }
    }

    /// Select the half-open index interval `[start, stop)`.
    pub const fn bounded(start: usize, stop: usize) -> ReadRange {
        ReadRange {
            start: Some(start),
            stop: Some(stop),
            step: STEP_ONE,
        }
    }

    /// Select `[start, start + length)`; an omitted `length` means
    /// "to the end".
    pub const fn slice(start: usize, length: Option<usize>) -> ReadRange {
        let stop = match length {
            Some(length) => Some(start.saturating_add(length)),
            None => None,
        };
        ReadRange {
            start: Some(start),
            stop,
            step: STEP_ONE,
        }
    }

    /// The same bounds with a different step.
    pub const fn with_step(self, step: NonZeroUsize) -> ReadRange {
        ReadRange {
            start: self.start,
            stop: self.stop,
            step,
        }
    }

    /// Clamp the selector against an element count.
    pub(crate) fn resolve(&self, count: usize) -> ResolvedRange {
        let start = self.start.unwrap_or(0).min(count);
        let stop = self.stop.unwrap_or(count).min(count).max(start);
        ResolvedRange {
            start,
            stop,
            step: self.step.get(),
        }
    }
}

impl Default for ReadRange {
    fn default() -> ReadRange {
        ReadRange::all()
    }
}
