//! Append-only typed track files.
//!
//! A track file is a fixed 16-byte header followed by a contiguous run of
//! same-width elements in native byte order:
//!
//! - byte 0: the [`ElementKind`] tag,
//! - byte 1: the element width in bytes,
//! - bytes 2..16: reserved, zero. The header length keeps every element,
//!   including 16-byte extended-precision ones, naturally aligned.
//!
//! There is no embedded length field. The element count is always derived
//! as `(file length - 16) / width`, recomputed from fresh file metadata on
//! every operation and never cached across calls. Deriving the count this
//! way makes appends safe against a partial trailing element (the floor
//! division excludes it) and makes clearing a single truncation; the
//! trade-off is that out-of-band modification of an open path invalidates
//! the derived count, which the single-owner model does not defend against.
//!
//! The kind recorded at creation is authoritative for the life of the
//! file: appends of any other kind fail with
//! [`TrackError::TypeMismatch`], and reads always return a sequence of the
//! recorded kind; for out-of-range reads an *empty* sequence of that
//! kind, never an error.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use snafu::prelude::*;

use crate::kind::ElementKind;
use crate::range::ReadRange;
use crate::sequence::Sequence;

pub mod error;

pub use error::{TrackError, TrackResult};

use error::{CorruptHeaderSnafu, IoSnafu, NotFoundSnafu, TypeMismatchSnafu};

/// Length of the fixed file header in bytes.
pub const HEADER_LEN: usize = 16;

fn encode_header(kind: ElementKind) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = kind.tag();
    header[1] = kind.width() as u8;
    header
}

fn decode_header(path: &Path, header: &[u8; HEADER_LEN]) -> TrackResult<ElementKind> {
    let kind = match ElementKind::from_tag(header[0]) {
        Ok(kind) => kind,
        Err(e) => {
            return CorruptHeaderSnafu {
                path: path.display().to_string(),
                detail: e.to_string(),
            }
            .fail();
        }
    };
    ensure!(
        header[1] as usize == kind.width(),
        CorruptHeaderSnafu {
            path: path.display().to_string(),
            detail: format!(
                "kind {kind} has width {} but the header records {}",
                kind.width(),
                header[1]
            ),
        }
    );
    Ok(kind)
}

/// A track file opened for reading: its handle, kind, and the element
/// count derived from the file length at open time.
pub(crate) struct OpenTrack {
    pub(crate) file: File,
    pub(crate) kind: ElementKind,
    pub(crate) count: usize,
}

/// Open `path` read-only, decode its header, and derive the element count.
pub(crate) fn open_for_read(path: &Path) -> TrackResult<OpenTrack> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(e).context(NotFoundSnafu {
                path: path.display().to_string(),
            });
        }
        Err(e) => {
            return Err(e).context(IoSnafu {
                path: path.display().to_string(),
            });
        }
    };

    let len = file
        .metadata()
        .context(IoSnafu {
            path: path.display().to_string(),
        })?
        .len();
    ensure!(
        len >= HEADER_LEN as u64,
        CorruptHeaderSnafu {
            path: path.display().to_string(),
            detail: format!("file length {len} is shorter than the {HEADER_LEN}-byte header"),
        }
    );

    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header).context(IoSnafu {
        path: path.display().to_string(),
    })?;
    let kind = decode_header(path, &header)?;

    let count = ((len - HEADER_LEN as u64) / kind.width() as u64) as usize;
    Ok(OpenTrack { file, kind, count })
}

fn read_selected(path: &Path, open: &mut OpenTrack, range: &ReadRange) -> TrackResult<Sequence> {
    let resolved = range.resolve(open.count);
    let selected = resolved.stop - resolved.start;
    if selected == 0 {
        return Ok(Sequence::empty(open.kind));
    }

    let width = open.kind.width();
    open.file
        .seek(SeekFrom::Start((HEADER_LEN + resolved.start * width) as u64))
        .context(IoSnafu {
            path: path.display().to_string(),
        })?;

    let mut buf = vec![0u8; selected * width];
    open.file.read_exact(&mut buf).context(IoSnafu {
        path: path.display().to_string(),
    })?;

    let sequence = Sequence::from_bytes(open.kind, &buf);
    if resolved.step > 1 {
        Ok(sequence.strided(resolved.step))
    } else {
        Ok(sequence)
    }
}

/// Write `sequence` to `path`, creating the file or truncating whatever
/// was there.
///
/// Equivalent to [`Track::create`] followed by one [`Track::append`] of
/// the whole sequence, and implemented exactly that way.
///
/// # Errors
///
/// Returns [`TrackError::Io`] when the filesystem rejects the write.
pub fn dump_track<P: AsRef<Path>>(path: P, sequence: &Sequence) -> TrackResult<()> {
    let mut track = Track::create(path)?;
    track.append(sequence)
}

/// Read the whole sequence stored at `path`.
///
/// # Errors
///
/// Returns [`TrackError::NotFound`] when the path does not exist,
/// [`TrackError::CorruptHeader`] when the header is truncated or carries
/// an unrecognized kind tag, and [`TrackError::Io`] on filesystem errors.
pub fn load_track<P: AsRef<Path>>(path: P) -> TrackResult<Sequence> {
    load_track_range(path, &ReadRange::all())
}

/// Read the elements of `path` selected by `range`.
///
/// The range is clamped against the element count derived from the file
/// length; a selection entirely past the end yields an empty sequence of
/// the recorded kind. See [`load_track`] for the error conditions.
pub fn load_track_range<P: AsRef<Path>>(path: P, range: &ReadRange) -> TrackResult<Sequence> {
    let path = path.as_ref();
    let mut open = open_for_read(path)?;
    read_selected(path, &mut open, range)
}

/// An append-only typed track file, open for extension.
///
/// The kind is established either by the header of a pre-existing file
/// ([`Track::open`]) or by the first [`Track::append`] on a fresh one.
/// Reads go through the same path-level machinery as [`load_track`], so
/// the element count is re-derived from the file length on every call.
#[derive(Debug)]
pub struct Track {
    path: PathBuf,
    file: File,
    kind: Option<ElementKind>,
}

impl Track {
    /// Open `path` for appending, discarding any previous content.
    ///
    /// The file is truncated to empty; the kind is unset until the first
    /// [`Track::append`], which writes a fresh header. Re-creating an
    /// existing track may therefore establish a different kind than the
    /// one it previously held.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] when the file cannot be opened or
    /// truncated.
    pub fn create<P: AsRef<Path>>(path: P) -> TrackResult<Track> {
        Track::construct(path.as_ref(), true)
    }

    /// Open `path` for appending, keeping any previous content.
    ///
    /// A pre-existing non-empty file must carry a valid header, whose kind
    /// then governs all appends. A missing or empty file behaves like a
    /// fresh track: the first append establishes the kind.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::CorruptHeader`] when a non-empty file does
    /// not start with a valid header, and [`TrackError::Io`] on
    /// filesystem errors.
    pub fn open<P: AsRef<Path>>(path: P) -> TrackResult<Track> {
        Track::construct(path.as_ref(), false)
    }

    fn construct(path: &Path, clear: bool) -> TrackResult<Track> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .context(IoSnafu {
                path: path.display().to_string(),
            })?;
        let mut track = Track {
            path: path.to_path_buf(),
            file,
            kind: None,
        };

        if clear {
            track.truncate(0)?;
            return Ok(track);
        }

        let len = track
            .file
            .metadata()
            .context(IoSnafu {
                path: path.display().to_string(),
            })?
            .len();
        if len == 0 {
            return Ok(track);
        }
        ensure!(
            len >= HEADER_LEN as u64,
            CorruptHeaderSnafu {
                path: path.display().to_string(),
                detail: format!("file length {len} is shorter than the {HEADER_LEN}-byte header"),
            }
        );

        let mut header = [0u8; HEADER_LEN];
        track.file.seek(SeekFrom::Start(0)).context(IoSnafu {
            path: path.display().to_string(),
        })?;
        track.file.read_exact(&mut header).context(IoSnafu {
            path: path.display().to_string(),
        })?;
        track.kind = Some(decode_header(path, &header)?);
        Ok(track)
    }

    /// The path this track writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The established kind, or `None` until the first append fixes it.
    pub fn kind(&self) -> Option<ElementKind> {
        self.kind
    }

    /// The current element count, derived from fresh file metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] when the file metadata cannot be read.
    pub fn size(&self) -> TrackResult<usize> {
        let len = self
            .file
            .metadata()
            .context(IoSnafu {
                path: self.path.display().to_string(),
            })?
            .len();
        match self.kind {
            Some(kind) => {
                Ok((len.saturating_sub(HEADER_LEN as u64) / kind.width() as u64) as usize)
            }
            None => Ok(0),
        }
    }

    /// Reset the element count to zero.
    ///
    /// When the kind is established the file is truncated to header-only,
    /// preserving the type; a fresh track is truncated to empty.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Io`] when the truncation fails.
    pub fn clear(&mut self) -> TrackResult<()> {
        match self.kind {
            Some(_) => self.truncate(HEADER_LEN as u64),
            None => self.truncate(0),
        }
    }

    /// Append `chunk` after the current content.
    ///
    /// The first append on a fresh track writes the header and establishes
    /// the kind; an empty chunk is enough to do so. Any partition of a
    /// sequence into consecutive chunks reconstructs the same file as a
    /// single append of the whole sequence.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::TypeMismatch`] when `chunk` is of a different
    /// kind than the track, and [`TrackError::Io`] when the write fails. A
    /// failed write may leave a partial trailing element behind; the
    /// floor-derived count excludes it, but callers should rebuild the
    /// track from source data.
    pub fn append(&mut self, chunk: &Sequence) -> TrackResult<()> {
        match self.kind {
            None => {
                self.file
                    .write_all(&encode_header(chunk.kind()))
                    .context(IoSnafu {
                        path: self.path.display().to_string(),
                    })?;
                self.kind = Some(chunk.kind());
            }
            Some(kind) => {
                ensure!(
                    kind == chunk.kind(),
                    TypeMismatchSnafu {
                        path: self.path.display().to_string(),
                        expected: kind,
                        found: chunk.kind(),
                    }
                );
            }
        }
        self.file.write_all(chunk.as_bytes()).context(IoSnafu {
            path: self.path.display().to_string(),
        })
    }

    /// Read the whole stored sequence.
    ///
    /// # Errors
    ///
    /// As [`load_track`]; in particular, a fresh track that has never been
    /// appended to has no header yet and reads as [`TrackError::CorruptHeader`].
    pub fn read(&self) -> TrackResult<Sequence> {
        self.read_range(&ReadRange::all())
    }

    /// Read `[start, start + length)`; an omitted `length` means "to the
    /// end". Bounds are clamped, so a `start` past the end yields an empty
    /// sequence of the track's kind.
    ///
    /// # Errors
    ///
    /// As [`load_track`].
    pub fn read_slice(&self, start: usize, length: Option<usize>) -> TrackResult<Sequence> {
        self.read_range(&ReadRange::slice(start, length))
    }

    /// Read the elements selected by `range`.
    ///
    /// # Errors
    ///
    /// As [`load_track`].
    pub fn read_range(&self, range: &ReadRange) -> TrackResult<Sequence> {
        load_track_range(&self.path, range)
    }

    fn truncate(&mut self, len: u64) -> TrackResult<()> {
        self.file.set_len(len).context(IoSnafu {
            path: self.path.display().to_string(),
        })
    }
}
