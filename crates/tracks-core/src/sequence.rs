//! Typed owned values and their bit-exact byte codec.
//!
//! Two containers cover everything the storage layer moves around:
//!
//! - [`Scalar`], one value of one [`ElementKind`], used for row-wise
//!   traffic through the multi-track writer and reader.
//! - [`Sequence`], a homogeneous owned vector of one kind, used for
//!   column-wise appends and reads.
//!
//! Encoding and decoding preserve bit patterns exactly. Elements are laid
//! out in native byte order with no per-element framing: a sequence of N
//! elements of width W encodes to exactly `N * W` bytes. Decoding reads
//! fixed-width chunks with unaligned loads, so byte buffers never need
//! element alignment.
//!
//! Extended precision is deliberately opaque: [`LongDouble`] carries the
//! stored 16 bytes as-is and compares bitwise. The storage layer never
//! interprets it arithmetically.

use bytemuck::{Pod, Zeroable, pod_read_unaligned};
use num_complex::Complex;
use snafu::prelude::*;

use crate::kind::ElementKind;

/// Complex of two `f32` fields.
pub type Complex32 = Complex<f32>;
/// Complex of two `f64` fields.
pub type Complex64 = Complex<f64>;
/// Complex of two extended-precision fields.
pub type ComplexLong = Complex<LongDouble>;

/// An extended-precision float as an opaque 16-byte bit pattern.
///
/// Rust has no native extended-precision type, and the storage layer does
/// not need one: the format contract is bit-pattern preservation, not
/// arithmetic. Values compare bitwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct LongDouble([u8; 16]);

impl LongDouble {
    /// The all-zero bit pattern (positive zero in every extended layout).
    pub const ZERO: LongDouble = LongDouble([0; 16]);

    /// Wrap a stored 16-byte bit pattern.
    pub const fn from_bits(bits: [u8; 16]) -> Self {
        LongDouble(bits)
    }

    /// The stored 16-byte bit pattern.
    pub const fn to_bits(self) -> [u8; 16] {
        self.0
    }
}

/// Kind-mismatch error raised when pushing a value into a sequence of a
/// different kind.
#[derive(Debug, Snafu)]
#[snafu(display("Cannot push a {found} value into a {expected} sequence"))]
pub struct KindMismatch {
    /// The kind of the sequence.
    pub expected: ElementKind,
    /// The kind of the rejected value.
    pub found: ElementKind,
}

/// One value of one element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Single-precision float.
    F32(f32),
    /// Double-precision float.
    F64(f64),
    /// Extended-precision float.
    F128(LongDouble),
    /// Complex of two `f32` fields.
    C64(Complex32),
    /// Complex of two `f64` fields.
    C128(Complex64),
    /// Complex of two extended-precision fields.
    C256(ComplexLong),
}

impl Scalar {
    /// The kind of this value.
    pub fn kind(&self) -> ElementKind {
        match self {
            Scalar::I8(_) => ElementKind::I8,
            Scalar::I16(_) => ElementKind::I16,
            Scalar::I32(_) => ElementKind::I32,
            Scalar::I64(_) => ElementKind::I64,
            Scalar::U8(_) => ElementKind::U8,
            Scalar::U16(_) => ElementKind::U16,
            Scalar::U32(_) => ElementKind::U32,
            Scalar::U64(_) => ElementKind::U64,
            Scalar::F32(_) => ElementKind::F32,
            Scalar::F64(_) => ElementKind::F64,
            Scalar::F128(_) => ElementKind::F128,
            Scalar::C64(_) => ElementKind::C64,
            Scalar::C128(_) => ElementKind::C128,
            Scalar::C256(_) => ElementKind::C256,
        }
    }
}

macro_rules! scalar_from {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$prim> for Scalar {
                fn from(value: $prim) -> Scalar {
                    Scalar::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64, LongDouble => F128,
    Complex32 => C64, Complex64 => C128, ComplexLong => C256,
}

/// A homogeneous owned sequence of one element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Sequence {
    /// 8-bit signed integers.
    I8(Vec<i8>),
    /// 16-bit signed integers.
    I16(Vec<i16>),
    /// 32-bit signed integers.
    I32(Vec<i32>),
    /// 64-bit signed integers.
    I64(Vec<i64>),
    /// 8-bit unsigned integers.
    U8(Vec<u8>),
    /// 16-bit unsigned integers.
    U16(Vec<u16>),
    /// 32-bit unsigned integers.
    U32(Vec<u32>),
    /// 64-bit unsigned integers.
    U64(Vec<u64>),
    /// Single-precision floats.
    F32(Vec<f32>),
    /// Double-precision floats.
    F64(Vec<f64>),
    /// Extended-precision floats.
    F128(Vec<LongDouble>),
    /// Complex values of two `f32` fields.
    C64(Vec<Complex32>),
    /// Complex values of two `f64` fields.
    C128(Vec<Complex64>),
    /// Complex values of two extended-precision fields.
    C256(Vec<ComplexLong>),
}

/// Run `$body` against the inner vector of every variant, rebuilding the
/// same variant from the result. `$body` must be generic over the element
/// type.
macro_rules! map_each_variant {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            Sequence::I8($v) => Sequence::I8($body),
            Sequence::I16($v) => Sequence::I16($body),
            Sequence::I32($v) => Sequence::I32($body),
            Sequence::I64($v) => Sequence::I64($body),
            Sequence::U8($v) => Sequence::U8($body),
            Sequence::U16($v) => Sequence::U16($body),
            Sequence::U32($v) => Sequence::U32($body),
            Sequence::U64($v) => Sequence::U64($body),
            Sequence::F32($v) => Sequence::F32($body),
            Sequence::F64($v) => Sequence::F64($body),
            Sequence::F128($v) => Sequence::F128($body),
            Sequence::C64($v) => Sequence::C64($body),
            Sequence::C128($v) => Sequence::C128($body),
            Sequence::C256($v) => Sequence::C256($body),
        }
    };
}

/// Evaluate `$body` against the inner vector of every variant, returning
/// its value unchanged. `$body` must produce the same type for every arm.
macro_rules! with_each_variant {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            Sequence::I8($v) => $body,
            Sequence::I16($v) => $body,
            Sequence::I32($v) => $body,
            Sequence::I64($v) => $body,
            Sequence::U8($v) => $body,
            Sequence::U16($v) => $body,
            Sequence::U32($v) => $body,
            Sequence::U64($v) => $body,
            Sequence::F32($v) => $body,
            Sequence::F64($v) => $body,
            Sequence::F128($v) => $body,
            Sequence::C64($v) => $body,
            Sequence::C128($v) => $body,
            Sequence::C256($v) => $body,
        }
    };
}

fn decode_vec<T: Pod>(bytes: &[u8]) -> Vec<T> {
    bytes
        .chunks_exact(std::mem::size_of::<T>())
        .map(pod_read_unaligned::<T>)
        .collect()
}

impl Sequence {
    /// An empty sequence of the given kind.
    pub fn empty(kind: ElementKind) -> Sequence {
        Sequence::with_capacity(kind, 0)
    }

    /// An empty sequence of the given kind with reserved capacity.
    pub fn with_capacity(kind: ElementKind, capacity: usize) -> Sequence {
        match kind {
            ElementKind::I8 => Sequence::I8(Vec::with_capacity(capacity)),
            ElementKind::I16 => Sequence::I16(Vec::with_capacity(capacity)),
            ElementKind::I32 => Sequence::I32(Vec::with_capacity(capacity)),
            ElementKind::I64 => Sequence::I64(Vec::with_capacity(capacity)),
            ElementKind::U8 => Sequence::U8(Vec::with_capacity(capacity)),
            ElementKind::U16 => Sequence::U16(Vec::with_capacity(capacity)),
            ElementKind::U32 => Sequence::U32(Vec::with_capacity(capacity)),
            ElementKind::U64 => Sequence::U64(Vec::with_capacity(capacity)),
            ElementKind::F32 => Sequence::F32(Vec::with_capacity(capacity)),
            ElementKind::F64 => Sequence::F64(Vec::with_capacity(capacity)),
            ElementKind::F128 => Sequence::F128(Vec::with_capacity(capacity)),
            ElementKind::C64 => Sequence::C64(Vec::with_capacity(capacity)),
            ElementKind::C128 => Sequence::C128(Vec::with_capacity(capacity)),
            ElementKind::C256 => Sequence::C256(Vec::with_capacity(capacity)),
        }
    }

    /// Decode `bytes` as a sequence of `kind` elements.
    ///
    /// Only complete elements are decoded; a trailing remainder shorter
    /// than one element width is ignored. This is how a track excludes the
    /// partial element an interrupted append may have left behind.
    pub fn from_bytes(kind: ElementKind, bytes: &[u8]) -> Sequence {
        match kind {
            ElementKind::I8 => Sequence::I8(decode_vec(bytes)),
            ElementKind::I16 => Sequence::I16(decode_vec(bytes)),
            ElementKind::I32 => Sequence::I32(decode_vec(bytes)),
            ElementKind::I64 => Sequence::I64(decode_vec(bytes)),
            ElementKind::U8 => Sequence::U8(decode_vec(bytes)),
            ElementKind::U16 => Sequence::U16(decode_vec(bytes)),
            ElementKind::U32 => Sequence::U32(decode_vec(bytes)),
            ElementKind::U64 => Sequence::U64(decode_vec(bytes)),
            ElementKind::F32 => Sequence::F32(decode_vec(bytes)),
            ElementKind::F64 => Sequence::F64(decode_vec(bytes)),
            ElementKind::F128 => Sequence::F128(decode_vec(bytes)),
            ElementKind::C64 => Sequence::C64(decode_vec(bytes)),
            ElementKind::C128 => Sequence::C128(decode_vec(bytes)),
            ElementKind::C256 => Sequence::C256(decode_vec(bytes)),
        }
    }

    /// The kind of this sequence.
    pub fn kind(&self) -> ElementKind {
        match self {
            Sequence::I8(_) => ElementKind::I8,
            Sequence::I16(_) => ElementKind::I16,
            Sequence::I32(_) => ElementKind::I32,
            Sequence::I64(_) => ElementKind::I64,
            Sequence::U8(_) => ElementKind::U8,
            Sequence::U16(_) => ElementKind::U16,
            Sequence::U32(_) => ElementKind::U32,
            Sequence::U64(_) => ElementKind::U64,
            Sequence::F32(_) => ElementKind::F32,
            Sequence::F64(_) => ElementKind::F64,
            Sequence::F128(_) => ElementKind::F128,
            Sequence::C64(_) => ElementKind::C64,
            Sequence::C128(_) => ElementKind::C128,
            Sequence::C256(_) => ElementKind::C256,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        with_each_variant!(self, v => v.len())
    }

    /// Whether the sequence holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The native-order encoded bytes of the elements, without any header.
    pub fn as_bytes(&self) -> &[u8] {
        with_each_variant!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Append one value of the matching kind.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] when `value` is of a different kind; the
    /// sequence is left unchanged.
    pub fn push(&mut self, value: Scalar) -> Result<(), KindMismatch> {
        match (self, value) {
            (Sequence::I8(v), Scalar::I8(x)) => v.push(x),
            (Sequence::I16(v), Scalar::I16(x)) => v.push(x),
            (Sequence::I32(v), Scalar::I32(x)) => v.push(x),
            (Sequence::I64(v), Scalar::I64(x)) => v.push(x),
            (Sequence::U8(v), Scalar::U8(x)) => v.push(x),
            (Sequence::U16(v), Scalar::U16(x)) => v.push(x),
            (Sequence::U32(v), Scalar::U32(x)) => v.push(x),
            (Sequence::U64(v), Scalar::U64(x)) => v.push(x),
            (Sequence::F32(v), Scalar::F32(x)) => v.push(x),
            (Sequence::F64(v), Scalar::F64(x)) => v.push(x),
            (Sequence::F128(v), Scalar::F128(x)) => v.push(x),
            (Sequence::C64(v), Scalar::C64(x)) => v.push(x),
            (Sequence::C128(v), Scalar::C128(x)) => v.push(x),
            (Sequence::C256(v), Scalar::C256(x)) => v.push(x),
            (seq, value) => {
                return KindMismatchSnafu {
                    expected: seq.kind(),
                    found: value.kind(),
                }
                .fail();
            }
        }
        Ok(())
    }

    /// The value at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        if index < self.len() {
            Some(self.scalar_at(index))
        } else {
            None
        }
    }

    /// Iterate over the values as [`Scalar`]s.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(move |index| self.scalar_at(index))
    }

    /// Remove all elements, keeping the kind and the allocation.
    pub fn truncate_to_empty(&mut self) {
        with_each_variant!(self, v => v.clear())
    }

    /// A new sequence keeping every `step`-th element, starting at the
    /// first. `step` must be at least 1.
    pub fn strided(&self, step: usize) -> Sequence {
        debug_assert!(step >= 1, "stride step must be at least 1");
        map_each_variant!(self, v => v.iter().copied().step_by(step.max(1)).collect())
    }

    fn scalar_at(&self, index: usize) -> Scalar {
        match self {
            Sequence::I8(v) => Scalar::I8(v[index]),
            Sequence::I16(v) => Scalar::I16(v[index]),
            Sequence::I32(v) => Scalar::I32(v[index]),
            Sequence::I64(v) => Scalar::I64(v[index]),
            Sequence::U8(v) => Scalar::U8(v[index]),
            Sequence::U16(v) => Scalar::U16(v[index]),
            Sequence::U32(v) => Scalar::U32(v[index]),
            Sequence::U64(v) => Scalar::U64(v[index]),
            Sequence::F32(v) => Scalar::F32(v[index]),
            Sequence::F64(v) => Scalar::F64(v[index]),
            Sequence::F128(v) => Scalar::F128(v[index]),
            Sequence::C64(v) => Scalar::C64(v[index]),
            Sequence::C128(v) => Scalar::C128(v[index]),
            Sequence::C256(v) => Scalar::C256(v[index]),
        }
    }
}

macro_rules! sequence_from_vec {
    ($($elem:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$elem>> for Sequence {
                fn from(values: Vec<$elem>) -> Sequence {
                    Sequence::$variant(values)
                }
            }
        )*
    };
}

sequence_from_vec! {
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64, LongDouble => F128,
    Complex32 => C64, Complex64 => C128, ComplexLong => C256,
}
