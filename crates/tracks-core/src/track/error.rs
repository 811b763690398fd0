//! Error types and SNAFU context selectors for the track layer.
//!
//! This module centralizes the `TrackError` enum used by the public API and
//! exposes context selectors (via `#[snafu(visibility(pub(crate)))]`) so
//! sibling modules can attach error context without re-exporting everything
//! at the crate root. Keep new variants here to ensure consistent
//! user-facing messages.

use snafu::{Backtrace, prelude::*};

use crate::kind::ElementKind;

/// General result type used by track operations.
pub type TrackResult<T> = Result<T, TrackError>;

/// Errors from track file operations.
///
/// Out-of-range reads are deliberately *not* represented here: they clamp
/// to the available extent and succeed, possibly with an empty sequence.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TrackError {
    /// The track file does not exist on open-for-read.
    #[snafu(display("Track not found: {path}"))]
    NotFound {
        /// The path that was not found.
        path: String,
        /// Underlying I/O error reported by the filesystem.
        source: std::io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// A header is present but truncated, carries an unrecognized kind
    /// tag, or disagrees with the registry about the element width.
    #[snafu(display("Corrupt track header at {path}: {detail}"))]
    CorruptHeader {
        /// The path of the corrupt file.
        path: String,
        /// What exactly is wrong with the header.
        detail: String,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// An append carried a chunk of a kind differing from the track's
    /// established kind.
    #[snafu(display("Type mismatch on {path}: track holds {expected}, chunk holds {found}"))]
    TypeMismatch {
        /// The path of the track that rejected the chunk.
        path: String,
        /// The kind established for the track.
        expected: ElementKind,
        /// The kind of the rejected chunk.
        found: ElementKind,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },

    /// An underlying device or filesystem error, surfaced unchanged.
    #[snafu(display("I/O error on track {path}: {source}"))]
    Io {
        /// The path where the I/O error occurred.
        path: String,
        /// Underlying I/O error with platform-specific details.
        source: std::io::Error,
        /// The backtrace at the time the error occurred.
        backtrace: Backtrace,
    },
}
