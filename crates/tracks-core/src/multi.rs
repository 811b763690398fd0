//! Row-synchronized buffered I/O over a set of parallel tracks.
//!
//! Batch producers of many parallel channels (one track per coordinate
//! component, say) should not pay one syscall per value per file. The two
//! types in this module amortize that cost while preserving row alignment
//! across channels:
//!
//! - [`MultiTracksWriter`] accepts rows (one scalar per channel), buffers
//!   them in memory, and fans each flush out as one column-wise append per
//!   track.
//! - [`MultiTracksReader`] streams rows back in lock-step, reading ahead
//!   in per-channel blocks to bound memory.
//!
//! Synchronization across channels is purely positional: row `i` of one
//! channel pairs with row `i` of every other because both were written and
//! read at the same iteration step. Nothing is stored to correlate files;
//! there is no cross-file index.
//!
//! Buffering is strictly a throughput optimization, never an isolation
//! mechanism. The buffer-size threshold affects flush and read-ahead
//! granularity only; the sequence of rows observed on disk and on
//! iteration is independent of it.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{MultiTracksError, MultiTracksResult};
pub use reader::MultiTracksReader;
pub use writer::MultiTracksWriter;

/// Buffer-size threshold, in bytes, that callers without a specific
/// budget can pass to the writer and reader constructors.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
