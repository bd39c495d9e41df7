//! Byte-order conversion between on-disk (always big-endian) and host order.
//!
//! The raw converters work on byte buffers and are used where the codec
//! deals in bytes (record markers, header count).  Array bodies skip the raw
//! step and decode straight into typed vectors through `byteorder`.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};
use crate::types::TypeTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOrder {
    Little,
    Big,
}

impl HostOrder {
    pub const NATIVE: HostOrder = if cfg!(target_endian = "big") {
        HostOrder::Big
    } else {
        HostOrder::Little
    };
}

/// Scalar width handled by the converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Four = 4,
    Eight = 8,
}

impl Width {
    #[inline]
    pub fn bytes(self) -> usize {
        self as usize
    }
}

// ── Raw converters ───────────────────────────────────────────────────────────

/// Convert `count` scalars from disk order into host order.
pub fn to_host(dst: &mut [u8], src: &[u8], width: Width, count: usize) -> Result<()> {
    convert(dst, src, width, count, HostOrder::NATIVE)
}

/// Convert `count` scalars from host order into disk order.
///
/// Swapping is its own inverse, so this is the same operation as [`to_host`];
/// both exist so call sites read in the direction of travel.
pub fn to_disk(dst: &mut [u8], src: &[u8], width: Width, count: usize) -> Result<()> {
    convert(dst, src, width, count, HostOrder::NATIVE)
}

/// Copy `count` scalars from `src` to `dst`, swapping each one unless `host`
/// is big-endian.
pub fn convert(
    dst:   &mut [u8],
    src:   &[u8],
    width: Width,
    count: usize,
    host:  HostOrder,
) -> Result<()> {
    let len = width.bytes().checked_mul(count).ok_or(Error::BufferSize {
        needed: usize::MAX,
        actual: src.len(),
    })?;
    if src.len() < len {
        return Err(Error::BufferSize { needed: len, actual: src.len() });
    }
    if dst.len() < len {
        return Err(Error::BufferSize { needed: len, actual: dst.len() });
    }
    dst[..len].copy_from_slice(&src[..len]);
    if host == HostOrder::Little {
        swap_chunks(&mut dst[..len], width);
    }
    Ok(())
}

/// In-place variant of [`convert`].  `buf` must hold a whole number of
/// scalars.
pub fn convert_in_place(buf: &mut [u8], width: Width, host: HostOrder) -> Result<()> {
    if buf.len() % width.bytes() != 0 {
        let needed = buf.len().next_multiple_of(width.bytes());
        return Err(Error::BufferSize { needed, actual: buf.len() });
    }
    if host == HostOrder::Little {
        swap_chunks(buf, width);
    }
    Ok(())
}

fn swap_chunks(buf: &mut [u8], width: Width) {
    for scalar in buf.chunks_exact_mut(width.bytes()) {
        scalar.reverse();
    }
}

/// Convert a raw body buffer in place according to its type: numerics are
/// swapped, marker and string payloads pass through untouched.
pub fn native_body(tag: TypeTag, buf: &mut [u8]) -> Result<()> {
    match tag {
        TypeTag::Inte | TypeTag::Real | TypeTag::Logi => {
            convert_in_place(buf, Width::Four, HostOrder::NATIVE)
        }
        TypeTag::Doub => convert_in_place(buf, Width::Eight, HostOrder::NATIVE),
        TypeTag::Mess | TypeTag::Char | TypeTag::Str(_) => Ok(()),
        TypeTag::X231 => Err(Error::Unsupported { tag: tag.to_bytes() }),
    }
}

// ── Typed body decoding ──────────────────────────────────────────────────────
//
// Callers guarantee `src.len()` is an exact multiple of the scalar width.

pub fn decode_i32s(src: &[u8], out: &mut Vec<i32>) {
    let start = out.len();
    out.resize(start + src.len() / 4, 0);
    BigEndian::read_i32_into(src, &mut out[start..]);
}

pub fn decode_f32s(src: &[u8], out: &mut Vec<f32>) {
    let start = out.len();
    out.resize(start + src.len() / 4, 0.0);
    BigEndian::read_f32_into(src, &mut out[start..]);
}

pub fn decode_f64s(src: &[u8], out: &mut Vec<f64>) {
    let start = out.len();
    out.resize(start + src.len() / 8, 0.0);
    BigEndian::read_f64_into(src, &mut out[start..]);
}

pub fn encode_i32s(src: &[i32], out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + src.len() * 4, 0);
    BigEndian::write_i32_into(src, &mut out[start..]);
}

pub fn encode_f32s(src: &[f32], out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + src.len() * 4, 0);
    BigEndian::write_f32_into(src, &mut out[start..]);
}

pub fn encode_f64s(src: &[f64], out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + src.len() * 8, 0);
    BigEndian::write_f64_into(src, &mut out[start..]);
}
