//! Deterministic sample data shared by the unit tests.

use crate::kind::ElementKind;
use crate::sequence::{Complex32, Complex64, ComplexLong, LongDouble, Scalar, Sequence};

/// A deterministic sequence of `len` distinct values of `kind`.
///
/// Values are spread over the representable range enough to catch byte
/// transposition and truncation; extended-precision values use patterned
/// bit payloads since the storage layer treats them as opaque.
pub(crate) fn sample_sequence(kind: ElementKind, len: usize) -> Sequence {
    let mut seq = Sequence::with_capacity(kind, len);
    for i in 0..len {
        seq.push(sample_scalar(kind, i))
            .expect("sample kind matches by construction");
    }
    seq
}

/// The `i`-th deterministic sample value of `kind`.
pub(crate) fn sample_scalar(kind: ElementKind, i: usize) -> Scalar {
    match kind {
        ElementKind::I8 => Scalar::I8(i as i8 - 7),
        ElementKind::I16 => Scalar::I16(i as i16 * -31),
        ElementKind::I32 => Scalar::I32(i as i32 * -100_003),
        ElementKind::I64 => Scalar::I64(i as i64 * -40_000_000_007),
        ElementKind::U8 => Scalar::U8(i as u8),
        ElementKind::U16 => Scalar::U16(i as u16 * 31),
        ElementKind::U32 => Scalar::U32(i as u32 * 100_003),
        ElementKind::U64 => Scalar::U64(i as u64 * 40_000_000_007),
        ElementKind::F32 => Scalar::F32(i as f32 * 0.25 - 3.5),
        ElementKind::F64 => Scalar::F64(i as f64 * 0.125 - 2.25),
        ElementKind::F128 => {
            let mut bits = [0u8; 16];
            bits[0] = i as u8;
            bits[9] = 0xa5;
            Scalar::F128(LongDouble::from_bits(bits))
        }
        ElementKind::C64 => Scalar::C64(Complex32::new(i as f32, -(i as f32) * 0.5)),
        ElementKind::C128 => Scalar::C128(Complex64::new(i as f64 * 1.5, i as f64 - 9.0)),
        ElementKind::C256 => {
            let mut re = [0u8; 16];
            let mut im = [0u8; 16];
            re[3] = i as u8;
            im[12] = !(i as u8);
            Scalar::C256(ComplexLong::new(
                LongDouble::from_bits(re),
                LongDouble::from_bits(im),
            ))
        }
    }
}
