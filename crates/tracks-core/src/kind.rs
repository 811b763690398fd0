//! Closed registry of the element kinds a track file can hold.
//!
//! Every track stores exactly one [`ElementKind`], established when the
//! file is first written and authoritative for the life of the file. The
//! registry maps each kind to:
//!
//! - a stable one-byte tag recorded in the file header, and
//! - a fixed element width in bytes.
//!
//! There is no widening, narrowing, or runtime type reflection anywhere:
//! the kind set is a closed enum and the size table is resolved at compile
//! time. Looking up an unknown tag fails with
//! [`KindError::UnsupportedType`]; the track layer reports the same
//! situation inside a file header as a corrupt header.

use std::fmt;

use snafu::prelude::*;

/// Error produced by the kind registry.
#[derive(Debug, Snafu)]
pub enum KindError {
    /// The requested tag does not name a registered element kind.
    #[snafu(display("Unsupported element kind tag {tag:#04x}"))]
    UnsupportedType {
        /// The unrecognized tag value.
        tag: u8,
    },
}

/// The numeric representation and byte width of a track's elements.
///
/// Floating-point and complex names follow the total bit width
/// (numpy-style): `F128` is the 16-byte extended-precision slot and
/// `C64`/`C128`/`C256` are interleaved re/im pairs of `f32`/`f64`/
/// extended precision respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// Single-precision float.
    F32,
    /// Double-precision float.
    F64,
    /// Extended-precision float, stored as an opaque 16-byte bit pattern.
    F128,
    /// Complex of two `f32` fields.
    C64,
    /// Complex of two `f64` fields.
    C128,
    /// Complex of two extended-precision fields.
    C256,
}

impl ElementKind {
    /// Every registered kind, in tag order. Useful for exhaustive sweeps.
    pub const ALL: [ElementKind; 14] = [
        ElementKind::I8,
        ElementKind::I16,
        ElementKind::I32,
        ElementKind::I64,
        ElementKind::U8,
        ElementKind::U16,
        ElementKind::U32,
        ElementKind::U64,
        ElementKind::F32,
        ElementKind::F64,
        ElementKind::F128,
        ElementKind::C64,
        ElementKind::C128,
        ElementKind::C256,
    ];

    /// Width of one element in bytes.
    pub const fn width(self) -> usize {
        match self {
            ElementKind::I8 | ElementKind::U8 => 1,
            ElementKind::I16 | ElementKind::U16 => 2,
            ElementKind::I32 | ElementKind::U32 | ElementKind::F32 => 4,
            ElementKind::I64 | ElementKind::U64 | ElementKind::F64 | ElementKind::C64 => 8,
            ElementKind::F128 | ElementKind::C128 => 16,
            ElementKind::C256 => 32,
        }
    }

    /// The stable tag recorded in a track header for this kind.
    ///
    /// Tags are grouped by family: `0x0n` signed, `0x1n` unsigned,
    /// `0x2n` floating point, `0x3n` complex.
    pub const fn tag(self) -> u8 {
        match self {
            ElementKind::I8 => 0x01,
            ElementKind::I16 => 0x02,
            ElementKind::I32 => 0x03,
            ElementKind::I64 => 0x04,
            ElementKind::U8 => 0x11,
            ElementKind::U16 => 0x12,
            ElementKind::U32 => 0x13,
            ElementKind::U64 => 0x14,
            ElementKind::F32 => 0x21,
            ElementKind::F64 => 0x22,
            ElementKind::F128 => 0x23,
            ElementKind::C64 => 0x31,
            ElementKind::C128 => 0x32,
            ElementKind::C256 => 0x33,
        }
    }

    /// Look up the kind registered under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`KindError::UnsupportedType`] when `tag` does not name a
    /// registered kind.
    pub fn from_tag(tag: u8) -> Result<ElementKind, KindError> {
        match tag {
            0x01 => Ok(ElementKind::I8),
            0x02 => Ok(ElementKind::I16),
            0x03 => Ok(ElementKind::I32),
            0x04 => Ok(ElementKind::I64),
            0x11 => Ok(ElementKind::U8),
            0x12 => Ok(ElementKind::U16),
            0x13 => Ok(ElementKind::U32),
            0x14 => Ok(ElementKind::U64),
            0x21 => Ok(ElementKind::F32),
            0x22 => Ok(ElementKind::F64),
            0x23 => Ok(ElementKind::F128),
            0x31 => Ok(ElementKind::C64),
            0x32 => Ok(ElementKind::C128),
            0x33 => Ok(ElementKind::C256),
            _ => UnsupportedTypeSnafu { tag }.fail(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::I64 => "i64",
            ElementKind::U8 => "u8",
            ElementKind::U16 => "u16",
            ElementKind::U32 => "u32",
            ElementKind::U64 => "u64",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
            ElementKind::F128 => "f128",
            ElementKind::C64 => "c64",
            ElementKind::C128 => "c128",
            ElementKind::C256 => "c256",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trips_for_every_kind() {
        for kind in ElementKind::ALL {
            let restored = ElementKind::from_tag(kind.tag()).expect("registered tag");
            assert_eq!(restored, kind);
        }
    }

    #[test]
    fn tags_are_unique() {
        for a in ElementKind::ALL {
            for b in ElementKind::ALL {
                if a != b {
                    assert_ne!(a.tag(), b.tag(), "{a} and {b} share a tag");
                }
            }
        }
    }

    #[test]
    fn widths_match_representation() {
        assert_eq!(ElementKind::I8.width(), 1);
        assert_eq!(ElementKind::U16.width(), 2);
        assert_eq!(ElementKind::I32.width(), 4);
        assert_eq!(ElementKind::U64.width(), 8);
        assert_eq!(ElementKind::F32.width(), 4);
        assert_eq!(ElementKind::F64.width(), 8);
        assert_eq!(ElementKind::F128.width(), 16);
        // Complex kinds are two fields of the matching precision.
        assert_eq!(ElementKind::C64.width(), 2 * ElementKind::F32.width());
        assert_eq!(ElementKind::C128.width(), 2 * ElementKind::F64.width());
        assert_eq!(ElementKind::C256.width(), 2 * ElementKind::F128.width());
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        let err = ElementKind::from_tag(0xff).expect_err("tag 0xff is unregistered");
        assert!(matches!(err, KindError::UnsupportedType { tag: 0xff }));
    }

    #[test]
    fn display_names_are_short_lowercase() {
        assert_eq!(ElementKind::I32.to_string(), "i32");
        assert_eq!(ElementKind::F128.to_string(), "f128");
        assert_eq!(ElementKind::C256.to_string(), "c256");
    }
}
