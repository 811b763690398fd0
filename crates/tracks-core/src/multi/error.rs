//! Error types and SNAFU context selectors for the multi-track layer.

use snafu::prelude::*;

use crate::kind::ElementKind;
use crate::track::TrackError;

/// General result type used by multi-track operations.
pub type MultiTracksResult<T> = Result<T, MultiTracksError>;

/// Errors from the multi-track writer and reader.
///
/// Length mismatches *between* channels are deliberately absent: reader
/// iteration stops at the shortest channel and surplus rows are ignored.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MultiTracksError {
    /// A multi-track set needs at least one channel.
    #[snafu(display("A multi-track set needs at least one channel"))]
    NoChannels,

    /// The channel path list and the kind list have different lengths.
    #[snafu(display("Channel list mismatch: {paths} paths but {kinds} kinds"))]
    ChannelCountMismatch {
        /// Number of channel paths supplied.
        paths: usize,
        /// Number of kinds supplied.
        kinds: usize,
    },

    /// A row carried the wrong number of values for this set.
    #[snafu(display("Row has {found} values but the set has {expected} channels"))]
    RowWidthMismatch {
        /// Number of channels in the set.
        expected: usize,
        /// Number of values in the rejected row.
        found: usize,
    },

    /// A row value's kind differs from its channel's kind.
    #[snafu(display("Type mismatch on channel {path}: channel holds {expected}, row value is {found}"))]
    RowTypeMismatch {
        /// Path of the channel that rejected the value.
        path: String,
        /// The kind established for the channel.
        expected: ElementKind,
        /// The kind of the rejected value.
        found: ElementKind,
    },

    /// A track-level failure on one channel.
    #[snafu(display("Track error on channel {path}: {source}"))]
    Channel {
        /// Path of the failing channel.
        path: String,
        /// Underlying track error.
        #[snafu(source, backtrace)]
        source: TrackError,
    },
}
