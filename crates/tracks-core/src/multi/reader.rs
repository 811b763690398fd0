//! Lock-step buffered reader over a set of parallel tracks.

use std::collections::VecDeque;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use snafu::prelude::*;

use crate::kind::ElementKind;
use crate::multi::error::{ChannelSnafu, MultiTracksResult, NoChannelsSnafu};
use crate::sequence::{Scalar, Sequence};
use crate::track::error::IoSnafu;
use crate::track::open_for_read;

#[derive(Debug)]
struct ReaderChannel {
    path: PathBuf,
    file: File,
    kind: ElementKind,
    pending: VecDeque<Scalar>,
}

impl ReaderChannel {
    fn refill(&mut self, rows: usize) -> MultiTracksResult<()> {
        let mut buf = vec![0u8; rows * self.kind.width()];
        self.file
            .read_exact(&mut buf)
            .context(IoSnafu {
                path: self.path.display().to_string(),
            })
            .context(ChannelSnafu {
                path: self.path.display().to_string(),
            })?;
        let block = Sequence::from_bytes(self.kind, &buf);
        self.pending.extend(block.iter());
        Ok(())
    }
}

/// Streams row tuples from a fixed set of tracks in lock-step.
///
/// Construction opens every channel and fixes the iteration length at the
/// *shortest* channel's element count; channels with surplus rows are
/// silently ignored. Iteration is lazy, forward-only, and single-pass; a
/// new reader instance always restarts at row 0.
///
/// Each channel reads ahead in fixed-size blocks derived from the
/// buffer-size threshold, decoding into a small pending queue, so memory
/// stays bounded however long the tracks are.
#[derive(Debug)]
pub struct MultiTracksReader {
    channels: Vec<ReaderChannel>,
    kinds: Vec<ElementKind>,
    rows_total: usize,
    rows_yielded: usize,
    rows_per_block: usize,
    poisoned: bool,
}

impl MultiTracksReader {
    /// Open every channel's track for reading.
    ///
    /// `buffer_size` is the read-ahead budget in bytes; each refill loads
    /// `max(1, buffer_size / row_bytes)` elements per channel.
    ///
    /// # Errors
    ///
    /// Returns [`MultiTracksError::NoChannels`] on an empty channel list
    /// and [`MultiTracksError::Channel`] when a track is missing or its
    /// header is corrupt.
    ///
    /// [`MultiTracksError::NoChannels`]: crate::multi::MultiTracksError::NoChannels
    /// [`MultiTracksError::Channel`]: crate::multi::MultiTracksError::Channel
    pub fn open<P: AsRef<Path>>(
        paths: &[P],
        buffer_size: usize,
    ) -> MultiTracksResult<MultiTracksReader> {
        ensure!(!paths.is_empty(), NoChannelsSnafu);

        let mut channels = Vec::with_capacity(paths.len());
        let mut kinds = Vec::with_capacity(paths.len());
        let mut rows_total = usize::MAX;
        for path in paths {
            let path = path.as_ref();
            let open = open_for_read(path).context(ChannelSnafu {
                path: path.display().to_string(),
            })?;
            rows_total = rows_total.min(open.count);
            kinds.push(open.kind);
            channels.push(ReaderChannel {
                path: path.to_path_buf(),
                file: open.file,
                kind: open.kind,
                pending: VecDeque::new(),
            });
        }

        let row_bytes: usize = kinds.iter().map(|kind| kind.width()).sum();
        Ok(MultiTracksReader {
            channels,
            kinds,
            rows_total,
            rows_yielded: 0,
            rows_per_block: (buffer_size / row_bytes).max(1),
            poisoned: false,
        })
    }

    /// The kind of each channel, in channel order.
    pub fn kinds(&self) -> &[ElementKind] {
        &self.kinds
    }

    /// The number of rows this reader will yield: the shortest channel's
    /// element count, fixed at construction.
    pub fn rows(&self) -> usize {
        self.rows_total
    }
}

impl Iterator for MultiTracksReader {
    type Item = MultiTracksResult<Vec<Scalar>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned || self.rows_yielded >= self.rows_total {
            return None;
        }

        let remaining = self.rows_total - self.rows_yielded;
        for channel in &mut self.channels {
            if channel.pending.is_empty() {
                let rows = self.rows_per_block.min(remaining);
                if let Err(e) = channel.refill(rows) {
                    self.poisoned = true;
                    return Some(Err(e));
                }
            }
        }

        let mut row = Vec::with_capacity(self.channels.len());
        for channel in &mut self.channels {
            match channel.pending.pop_front() {
                Some(value) => row.push(value),
                None => {
                    debug_assert!(false, "pending queue empty right after refill");
                    self.poisoned = true;
                    return None;
                }
            }
        }
        self.rows_yielded += 1;
        Some(Ok(row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.poisoned {
            return (0, Some(0));
        }
        let remaining = self.rows_total - self.rows_yielded;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::multi::MultiTracksError;
    use crate::track::dump_track;

    #[test]
    fn exposes_channel_kinds_in_order() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("a"), tmp.path().join("b")];
        dump_track(&paths[0], &vec![1.0f64].into()).expect("dump a");
        dump_track(&paths[1], &vec![2i32].into()).expect("dump b");

        let reader = MultiTracksReader::open(&paths, 1024).expect("open");
        assert_eq!(reader.kinds(), [ElementKind::F64, ElementKind::I32]);
        assert_eq!(reader.rows(), 1);
    }

    #[test]
    fn stops_at_the_shortest_channel() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("long"), tmp.path().join("short")];
        dump_track(&paths[0], &vec![1u16, 2, 3, 4, 5].into()).expect("dump long");
        dump_track(&paths[1], &vec![10u16, 20].into()).expect("dump short");

        let reader = MultiTracksReader::open(&paths, 8).expect("open");
        let rows: Vec<Vec<Scalar>> = reader.collect::<Result<_, _>>().expect("iterate");
        assert_eq!(
            rows,
            vec![
                vec![Scalar::U16(1), Scalar::U16(10)],
                vec![Scalar::U16(2), Scalar::U16(20)],
            ]
        );
    }

    #[test]
    fn missing_channel_fails_at_construction() {
        let tmp = TempDir::new().expect("tempdir");
        let present = tmp.path().join("present");
        dump_track(&present, &vec![1i8].into()).expect("dump");
        let missing = tmp.path().join("missing");

        let err = MultiTracksReader::open(&[present, missing], 64).expect_err("missing channel");
        assert!(matches!(err, MultiTracksError::Channel { .. }));
    }

    #[test]
    fn tiny_buffer_still_yields_every_row_in_order() {
        let tmp = TempDir::new().expect("tempdir");
        let paths = [tmp.path().join("a"), tmp.path().join("b")];
        dump_track(&paths[0], &vec![0i64, 1, 2, 3, 4, 5, 6].into()).expect("dump a");
        dump_track(&paths[1], &vec![0u8, 10, 20, 30, 40, 50, 60].into()).expect("dump b");

        // One byte of read-ahead budget degenerates to one row per refill.
        let reader = MultiTracksReader::open(&paths, 1).expect("open");
        let rows: Vec<Vec<Scalar>> = reader.collect::<Result<_, _>>().expect("iterate");
        assert_eq!(rows.len(), 7);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row[0], Scalar::I64(i as i64));
            assert_eq!(row[1], Scalar::U8(i as u8 * 10));
        }
    }

    #[test]
    fn empty_tracks_yield_no_rows() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("empty");
        dump_track(&path, &Sequence::empty(ElementKind::F32)).expect("dump");

        let mut reader = MultiTracksReader::open(&[path], 64).expect("open");
        assert_eq!(reader.rows(), 0);
        assert!(reader.next().is_none());
    }
}
