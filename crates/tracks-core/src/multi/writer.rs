//! Buffered row-wise writer fanning out to one track per channel.

use std::path::Path;

use log::{debug, warn};
use snafu::prelude::*;

use crate::kind::ElementKind;
use crate::multi::error::{
    ChannelCountMismatchSnafu, ChannelSnafu, MultiTracksResult, NoChannelsSnafu,
    RowTypeMismatchSnafu, RowWidthMismatchSnafu,
};
use crate::sequence::{Scalar, Sequence};
use crate::track::Track;

#[derive(Debug)]
struct WriterChannel {
    track: Track,
    column: Sequence,
}

/// Buffers row-wise input and writes it as column-wise appends to a fixed
/// set of tracks.
///
/// Rows accumulate in memory until their estimated encoded size reaches
/// the buffer-size threshold; each flush then appends one contiguous chunk
/// per channel. The rows observed by any channel's track exactly match the
/// [`MultiTracksWriter::dump_row`] call order, whatever the threshold.
///
/// [`MultiTracksWriter::finalize`] flushes the remainder and closes all
/// handles. Rows buffered but never flushed are lost when the writer is
/// dropped without finalizing; buffering exists purely to amortize I/O
/// cost, and the drop path only makes the loss visible in the log.
#[derive(Debug)]
pub struct MultiTracksWriter {
    channels: Vec<WriterChannel>,
    kinds: Vec<ElementKind>,
    row_bytes: usize,
    buffer_size: usize,
    buffered_rows: usize,
}

impl MultiTracksWriter {
    /// Create (clearing) one track per channel.
    ///
    /// `paths` and `kinds` pair up positionally and must have the same
    /// nonzero length. `buffer_size` is the flush threshold in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MultiTracksError::NoChannels`] or
    /// [`MultiTracksError::ChannelCountMismatch`] on a malformed channel
    /// list, and [`MultiTracksError::Channel`] when a track cannot be
    /// created.
    ///
    /// [`MultiTracksError::NoChannels`]: crate::multi::MultiTracksError::NoChannels
    /// [`MultiTracksError::ChannelCountMismatch`]: crate::multi::MultiTracksError::ChannelCountMismatch
    /// [`MultiTracksError::Channel`]: crate::multi::MultiTracksError::Channel
    pub fn create<P: AsRef<Path>>(
        paths: &[P],
        kinds: &[ElementKind],
        buffer_size: usize,
    ) -> MultiTracksResult<MultiTracksWriter> {
        ensure!(!paths.is_empty(), NoChannelsSnafu);
        ensure!(
            paths.len() == kinds.len(),
            ChannelCountMismatchSnafu {
                paths: paths.len(),
                kinds: kinds.len(),
            }
        );

        let mut channels = Vec::with_capacity(paths.len());
        for (path, &kind) in paths.iter().zip(kinds) {
            let path = path.as_ref();
            let track = Track::create(path).context(ChannelSnafu {
                path: path.display().to_string(),
            })?;
            channels.push(WriterChannel {
                track,
                column: Sequence::empty(kind),
            });
        }

        Ok(MultiTracksWriter {
            channels,
            kinds: kinds.to_vec(),
            row_bytes: kinds.iter().map(|kind| kind.width()).sum(),
            buffer_size,
            buffered_rows: 0,
        })
    }

    /// The kind of each channel, in channel order.
    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    /// Buffer one row, one value per channel in channel order.
    ///
    /// The whole row is validated before anything is buffered, so a
    /// rejected row leaves the writer unchanged. When the buffered rows
    /// reach the threshold the buffer is flushed to the tracks.
    ///
    /// # Errors
    ///
    /// Returns [`MultiTracksError::RowWidthMismatch`] or
    /// [`MultiTracksError::RowTypeMismatch`] for a malformed row, and
    /// [`MultiTracksError::Channel`] when a triggered flush fails.
    ///
    /// [`MultiTracksError::RowWidthMismatch`]: crate::multi::MultiTracksError::RowWidthMismatch
    /// [`MultiTracksError::RowTypeMismatch`]: crate::multi::MultiTracksError::RowTypeMismatch
    /// [`MultiTracksError::Channel`]: crate::multi::MultiTracksError::Channel
    pub fn dump_row(&mut self, row: &[Scalar]) -> MultiTracksResult<()> {
        ensure!(
            row.len() == self.channels.len(),
            RowWidthMismatchSnafu {
                expected: self.channels.len(),
                found: row.len(),
            }
        );
        for (channel, value) in self.channels.iter().zip(row) {
            ensure!(
                value.kind() == channel.column.kind(),
                RowTypeMismatchSnafu {
                    path: channel.track.path().display().to_string(),
                    expected: channel.column.kind(),
                    found: value.kind(),
                }
            );
        }

        for (channel, value) in self.channels.iter_mut().zip(row) {
            channel.column.push(*value).map_err(|e| {
                RowTypeMismatchSnafu {
                    path: channel.track.path().display().to_string(),
                    expected: e.expected,
                    found: e.found,
                }
                .build()
            })?;
        }
        self.buffered_rows += 1;

        if self.buffered_rows * self.row_bytes >= self.buffer_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write all buffered rows to the tracks, one append per channel.
    ///
    /// # Errors
    ///
    /// Returns [`MultiTracksError::Channel`] when an append fails. Flushes
    /// are OS-buffered writes; no durability barrier is implied.
    ///
    /// [`MultiTracksError::Channel`]: crate::multi::MultiTracksError::Channel
    pub fn flush(&mut self) -> MultiTracksResult<()> {
        if self.buffered_rows == 0 {
            return Ok(());
        }
        debug!(
            "flushing {} buffered rows to {} tracks",
            self.buffered_rows,
            self.channels.len()
        );
        for channel in &mut self.channels {
            channel.track.append(&channel.column).context(ChannelSnafu {
                path: channel.track.path().display().to_string(),
            })?;
            channel.column.truncate_to_empty();
        }
        self.buffered_rows = 0;
        Ok(())
    }

    /// Flush the remaining buffered rows and release all file handles.
    ///
    /// # Errors
    ///
    /// Returns [`MultiTracksError::Channel`] when the final flush fails;
    /// the handles are released either way.
    ///
    /// [`MultiTracksError::Channel`]: crate::multi::MultiTracksError::Channel
    pub fn finalize(mut self) -> MultiTracksResult<()> {
        self.flush()
    }
}

impl Drop for MultiTracksWriter {
    fn drop(&mut self) {
        if self.buffered_rows > 0 {
            warn!(
                "dropping multi-track writer with {} buffered rows never flushed to {} tracks; \
                 finalize() was not called",
                self.buffered_rows,
                self.channels.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::kind::ElementKind;
    use crate::multi::MultiTracksError;
    use crate::track::load_track;

    #[test]
    fn rejects_empty_and_mismatched_channel_lists() {
        let tmp = TempDir::new().expect("tempdir");
        let empty: [&Path; 0] = [];
        let err = MultiTracksWriter::create(&empty, &[], 64).expect_err("no channels");
        assert!(matches!(err, MultiTracksError::NoChannels));

        let a = tmp.path().join("a");
        let err = MultiTracksWriter::create(&[&a], &[], 64).expect_err("one path, zero kinds");
        assert!(matches!(
            err,
            MultiTracksError::ChannelCountMismatch { paths: 1, kinds: 0 }
        ));
    }

    #[test]
    fn rejected_rows_leave_the_buffer_untouched() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("a"), tmp.path().join("b")];
        let kinds = [ElementKind::F64, ElementKind::I32];
        let mut writer = MultiTracksWriter::create(&paths, &kinds, 1024).expect("create");

        let err = writer
            .dump_row(&[Scalar::F64(1.0)])
            .expect_err("row too short");
        assert!(matches!(
            err,
            MultiTracksError::RowWidthMismatch {
                expected: 2,
                found: 1
            }
        ));

        let err = writer
            .dump_row(&[Scalar::F64(1.0), Scalar::F32(2.0)])
            .expect_err("f32 into an i32 channel");
        assert!(matches!(
            err,
            MultiTracksError::RowTypeMismatch {
                expected: ElementKind::I32,
                found: ElementKind::F32,
                ..
            }
        ));

        writer
            .dump_row(&[Scalar::F64(1.0), Scalar::I32(2)])
            .expect("well-formed row");
        writer.finalize().expect("finalize");
        assert_eq!(load_track(&paths[0]).expect("load a"), vec![1.0f64].into());
        assert_eq!(load_track(&paths[1]).expect("load b"), vec![2i32].into());
    }

    #[test]
    fn tiny_threshold_flushes_every_row() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("a")];
        let mut writer =
            MultiTracksWriter::create(&paths, &[ElementKind::U8], 1).expect("create");
        for i in 0..5u8 {
            writer.dump_row(&[Scalar::U8(i)]).expect("dump_row");
            // Every row crosses the one-byte threshold immediately.
            assert_eq!(
                load_track(&paths[0]).expect("load").len(),
                usize::from(i) + 1
            );
        }
        writer.finalize().expect("finalize");
    }

    #[test]
    fn dropping_without_finalize_loses_only_unflushed_rows() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("a")];
        // Threshold of 3 elements' worth of bytes: rows 3 and 6 trigger flushes.
        let mut writer =
            MultiTracksWriter::create(&paths, &[ElementKind::I64], 3 * 8).expect("create");
        for i in 0..8i64 {
            writer.dump_row(&[Scalar::I64(i)]).expect("dump_row");
        }
        drop(writer);

        let on_disk = load_track(&paths[0]).expect("load");
        assert_eq!(on_disk, vec![0i64, 1, 2, 3, 4, 5].into());
    }
}
