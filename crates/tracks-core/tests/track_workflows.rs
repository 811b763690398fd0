#![allow(missing_docs)]

//! Lifecycle workflows over single track files, exercised through the
//! public API the way an importer/exporter front end would.

use std::num::NonZeroUsize;

use tempfile::TempDir;
use tracks_core::kind::ElementKind;
use tracks_core::range::ReadRange;
use tracks_core::track::{Track, TrackError, dump_track, load_track, load_track_range};

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn import_extend_and_reload() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("com.pos.x");

    // An importer dumps a first batch of frames...
    dump_track(&path, &vec![0.0f64, 0.1, 0.2].into())?;

    // ...a later run opens the same track and extends it...
    let mut track = Track::open(&path)?;
    assert_eq!(track.kind(), Some(ElementKind::F64));
    assert_eq!(track.size()?, 3);
    track.append(&vec![0.3f64, 0.4].into())?;
    drop(track);

    // ...and an analysis pass reads the whole quantity back.
    assert_eq!(load_track(&path)?, vec![0.0f64, 0.1, 0.2, 0.3, 0.4].into());
    Ok(())
}

#[test]
fn frame_window_selection_with_stride() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("temperature");
    let frames: Vec<f32> = (0..100).map(|i| 300.0 + i as f32).collect();
    dump_track(&path, &frames.clone().into())?;

    // Skip equilibration (first 20 frames), subsample every 10th.
    let step = NonZeroUsize::new(10).ok_or("step")?;
    let range = ReadRange::slice(20, None).with_step(step);
    let picked = load_track_range(&path, &range)?;
    let expected: Vec<f32> = (20..100).step_by(10).map(|i| 300.0 + i as f32).collect();
    assert_eq!(picked, expected.into());
    Ok(())
}

#[test]
fn window_past_the_end_is_an_empty_sequence() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("short-run");
    dump_track(&path, &vec![1u64, 2, 3].into())?;

    let tail = load_track_range(&path, &ReadRange::slice(1000, Some(50)))?;
    assert!(tail.is_empty());
    assert_eq!(tail.kind(), ElementKind::U64);
    Ok(())
}

#[test]
fn a_quantity_can_be_recomputed_with_a_different_kind() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("recomputed");
    dump_track(&path, &vec![1i32, 2, 3].into())?;
    // A re-import with higher precision replaces the file wholesale.
    dump_track(&path, &vec![1.0f64, 2.0, 3.0].into())?;

    let restored = load_track(&path)?;
    assert_eq!(restored.kind(), ElementKind::F64);
    assert_eq!(restored.len(), 3);
    Ok(())
}

#[test]
fn missing_and_corrupt_tracks_are_distinct_failures() -> TestResult {
    let tmp = TempDir::new()?;

    let err = load_track(tmp.path().join("never-written")).expect_err("missing file");
    assert!(matches!(err, TrackError::NotFound { .. }));

    let garbled = tmp.path().join("garbled");
    std::fs::write(&garbled, b"not a track file at all")?;
    let err = load_track(&garbled).expect_err("unrecognized header");
    assert!(matches!(err, TrackError::CorruptHeader { .. }));
    Ok(())
}

#[test]
fn reopening_never_drifts_the_stored_bytes() -> TestResult {
    // Append the same data through several open/close cycles with uneven
    // chunks; the result must equal one big dump.
    let tmp = TempDir::new()?;
    let chunked = tmp.path().join("chunked");
    let whole = tmp.path().join("whole");

    let values: Vec<i64> = (0..64).map(|i| i * i - 1000).collect();
    dump_track(&whole, &values.clone().into())?;

    Track::create(&chunked)?.append(&values[0..5].to_vec().into())?;
    Track::open(&chunked)?.append(&values[5..6].to_vec().into())?;
    {
        let mut track = Track::open(&chunked)?;
        track.append(&values[6..40].to_vec().into())?;
        track.append(&values[40..64].to_vec().into())?;
    }

    assert_eq!(std::fs::read(&chunked)?, std::fs::read(&whole)?);
    Ok(())
}
