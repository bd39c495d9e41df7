//! Type registry: the closed set of on-disk type tags.
//!
//! # Identity rules
//! Every array carries a 4-byte ASCII type tag in its header.  The tag is read
//! as a big-endian `u32` and must match one of the frozen values below
//! exactly.  There is no fallback, no case folding and no extension point: a
//! tag outside the set is an [`Error::UnknownTag`].
//!
//! The 99 fixed-width string types `C001`..`C099` share one variant,
//! [`TypeTag::Str`], whose width is decoded from the two ASCII digit bytes.
//!
//! # Block capacity
//! Array bodies are split into records of at most [`BLOCK_SIZE_NUMERIC`]
//! elements for numeric types and [`BLOCK_SIZE_STRING`] elements for string
//! types.  Only the last record of an array may be shorter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ── Frozen tag values ───────────────────────────────────────────────────────

pub const TAG_INTE: u32 = u32::from_be_bytes(*b"INTE");
pub const TAG_REAL: u32 = u32::from_be_bytes(*b"REAL");
pub const TAG_DOUB: u32 = u32::from_be_bytes(*b"DOUB");
pub const TAG_CHAR: u32 = u32::from_be_bytes(*b"CHAR");
pub const TAG_LOGI: u32 = u32::from_be_bytes(*b"LOGI");
pub const TAG_MESS: u32 = u32::from_be_bytes(*b"MESS");
pub const TAG_X231: u32 = u32::from_be_bytes(*b"X231");

/// High half shared by every `C0NN` tag.
const C0NN_PREFIX: u32 = u32::from_be_bytes(*b"C0\0\0");

/// Maximum elements per body record for numeric (and marker) types.
pub const BLOCK_SIZE_NUMERIC: usize = 1000;
/// Maximum elements per body record for string types.
pub const BLOCK_SIZE_STRING: usize = 105;

// ── StrWidth ────────────────────────────────────────────────────────────────

/// Width in bytes of a `C0NN` string element.  Always in `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StrWidth(u8);

impl StrWidth {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 99;

    pub fn new(width: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&width).then_some(StrWidth(width))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for StrWidth {
    type Error = String;

    fn try_from(width: u8) -> std::result::Result<Self, String> {
        StrWidth::new(width).ok_or_else(|| format!("string width {width} outside 1..=99"))
    }
}

impl From<StrWidth> for u8 {
    fn from(w: StrWidth) -> u8 {
        w.0
    }
}

// ── Category ────────────────────────────────────────────────────────────────

/// Storage category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Big-endian scalars, byte-swapped on little-endian hosts.
    Numeric,
    /// Opaque fixed-width byte runs, never byte-swapped.
    FixedString,
    /// Zero-width marker without a body.
    Marker,
    /// Known tag that cannot be decoded.
    Unsupported,
}

// ── TypeTag ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Inte,
    Real,
    Doub,
    Char,
    Logi,
    Mess,
    X231,
    Str(StrWidth),
}

impl TypeTag {
    /// Resolve a raw big-endian tag value.
    pub fn from_u32(value: u32) -> Result<Self> {
        let tag = match value {
            TAG_INTE => TypeTag::Inte,
            TAG_REAL => TypeTag::Real,
            TAG_DOUB => TypeTag::Doub,
            TAG_CHAR => TypeTag::Char,
            TAG_LOGI => TypeTag::Logi,
            TAG_MESS => TypeTag::Mess,
            TAG_X231 => TypeTag::X231,
            v if v & 0xFFFF_0000 == C0NN_PREFIX => {
                let high = (v >> 8) as u8;
                let low = v as u8;
                if !high.is_ascii_digit() || !low.is_ascii_digit() {
                    return Err(Error::UnknownTag { tag: value.to_be_bytes() });
                }
                let width = (high - b'0') * 10 + (low - b'0');
                let width = StrWidth::new(width)
                    .ok_or(Error::UnknownTag { tag: value.to_be_bytes() })?;
                TypeTag::Str(width)
            }
            _ => return Err(Error::UnknownTag { tag: value.to_be_bytes() }),
        };
        Ok(tag)
    }

    /// Resolve the four tag bytes as they appear on disk.
    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self> {
        Self::from_u32(u32::from_be_bytes(bytes))
    }

    /// The frozen big-endian tag value.
    pub fn to_u32(self) -> u32 {
        match self {
            TypeTag::Inte => TAG_INTE,
            TypeTag::Real => TAG_REAL,
            TypeTag::Doub => TAG_DOUB,
            TypeTag::Char => TAG_CHAR,
            TypeTag::Logi => TAG_LOGI,
            TypeTag::Mess => TAG_MESS,
            TypeTag::X231 => TAG_X231,
            TypeTag::Str(w) => {
                let w = w.0 as u32;
                C0NN_PREFIX | (u32::from(b'0') + w / 10) << 8 | (u32::from(b'0') + w % 10)
            }
        }
    }

    /// The four tag bytes as written to disk.
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.to_u32().to_be_bytes()
    }

    pub fn category(self) -> Category {
        match self {
            TypeTag::Inte | TypeTag::Real | TypeTag::Doub | TypeTag::Logi => Category::Numeric,
            TypeTag::Char | TypeTag::Str(_) => Category::FixedString,
            TypeTag::Mess => Category::Marker,
            TypeTag::X231 => Category::Unsupported,
        }
    }

    /// Byte width of one element.  `MESS` is zero-width; `X231` has no
    /// defined width and fails.
    pub fn element_size(self) -> Result<usize> {
        match self {
            TypeTag::Inte | TypeTag::Real | TypeTag::Logi => Ok(4),
            TypeTag::Doub | TypeTag::Char => Ok(8),
            TypeTag::Mess => Ok(0),
            TypeTag::Str(w) => Ok(w.get()),
            TypeTag::X231 => Err(Error::Unsupported { tag: self.to_bytes() }),
        }
    }

    /// Maximum number of elements in one body record.
    pub fn block_capacity(self) -> usize {
        match self {
            TypeTag::Char | TypeTag::Str(_) => BLOCK_SIZE_STRING,
            TypeTag::Inte
            | TypeTag::Real
            | TypeTag::Doub
            | TypeTag::Logi
            | TypeTag::Mess
            | TypeTag::X231 => BLOCK_SIZE_NUMERIC,
        }
    }

    /// Canonical 4-character name.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Inte => "INTE",
            TypeTag::Real => "REAL",
            TypeTag::Doub => "DOUB",
            TypeTag::Char => "CHAR",
            TypeTag::Logi => "LOGI",
            TypeTag::Mess => "MESS",
            TypeTag::X231 => "X231",
            TypeTag::Str(w) => {
                let i = (w.get() - 1) * 4;
                &C0NN_NAMES[i..i + 4]
            }
        }
    }

    /// Every defined tag, fixed tags first, then `C001`..`C099`.
    pub fn all() -> impl Iterator<Item = TypeTag> {
        const FIXED: [TypeTag; 7] = [
            TypeTag::Inte,
            TypeTag::Real,
            TypeTag::Doub,
            TypeTag::Char,
            TypeTag::Logi,
            TypeTag::Mess,
            TypeTag::X231,
        ];
        FIXED
            .into_iter()
            .chain((StrWidth::MIN..=StrWidth::MAX).map(|w| TypeTag::Str(StrWidth(w))))
    }
}

/// `C001C002...C099` packed end to end; `TypeTag::name` slices into it.
const C0NN_NAMES: &str = concat!(
    "C001C002C003C004C005C006C007C008C009C010",
    "C011C012C013C014C015C016C017C018C019C020",
    "C021C022C023C024C025C026C027C028C029C030",
    "C031C032C033C034C035C036C037C038C039C040",
    "C041C042C043C044C045C046C047C048C049C050",
    "C051C052C053C054C055C056C057C058C059C060",
    "C061C062C063C064C065C066C067C068C069C070",
    "C071C072C073C074C075C076C077C078C079C080",
    "C081C082C083C084C085C086C087C088C089C090",
    "C091C092C093C094C095C096C097C098C099",
);

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; 4] = s.as_bytes().try_into().map_err(|_| {
            let mut tag = [b' '; 4];
            for (dst, src) in tag.iter_mut().zip(s.bytes()) {
                *dst = src;
            }
            Error::UnknownTag { tag }
        })?;
        Self::from_bytes(bytes)
    }
}

// ── Free-function façade ────────────────────────────────────────────────────

/// Resolve four on-disk tag bytes.
pub fn resolve_tag(bytes: [u8; 4]) -> Result<TypeTag> {
    TypeTag::from_bytes(bytes)
}

pub fn element_size(tag: TypeTag) -> Result<usize> {
    tag.element_size()
}

pub fn block_capacity(tag: TypeTag) -> usize {
    tag.block_capacity()
}

pub fn display_name(tag: TypeTag) -> &'static str {
    tag.name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_tags_resolve() {
        assert_eq!(resolve_tag(*b"INTE").unwrap(), TypeTag::Inte);
        assert_eq!(resolve_tag(*b"REAL").unwrap(), TypeTag::Real);
        assert_eq!(resolve_tag(*b"DOUB").unwrap(), TypeTag::Doub);
        assert_eq!(resolve_tag(*b"CHAR").unwrap(), TypeTag::Char);
        assert_eq!(resolve_tag(*b"LOGI").unwrap(), TypeTag::Logi);
        assert_eq!(resolve_tag(*b"MESS").unwrap(), TypeTag::Mess);
        assert_eq!(resolve_tag(*b"X231").unwrap(), TypeTag::X231);
    }

    #[test]
    fn string_widths_decode_from_digits() {
        let c001 = resolve_tag(*b"C001").unwrap();
        assert_eq!(c001, TypeTag::Str(StrWidth::new(1).unwrap()));
        assert_eq!(element_size(c001).unwrap(), 1);
        assert_eq!(element_size(resolve_tag(*b"C042").unwrap()).unwrap(), 42);
        assert_eq!(element_size(resolve_tag(*b"C099").unwrap()).unwrap(), 99);
    }

    #[test]
    fn near_misses_are_unknown() {
        for bad in [b"C000", b"C0AA", b"C100", b"C0 1", b"c001", b"inte", b"INT ", b"C09:", b"\0\0\0\0"] {
            let err = resolve_tag(*bad).unwrap_err();
            assert!(matches!(err, Error::UnknownTag { tag } if &tag == bad), "{bad:?}");
        }
    }

    #[test]
    fn name_is_inverse_of_resolve() {
        let mut n = 0;
        for tag in TypeTag::all() {
            let name = display_name(tag);
            assert_eq!(name.len(), 4);
            assert_eq!(tag.to_bytes(), name.as_bytes());
            assert_eq!(resolve_tag(tag.to_bytes()).unwrap(), tag);
            assert_eq!(name.parse::<TypeTag>().unwrap(), tag);
            n += 1;
        }
        assert_eq!(n, 106);
    }

    #[test]
    fn element_sizes() {
        assert_eq!(element_size(TypeTag::Inte).unwrap(), 4);
        assert_eq!(element_size(TypeTag::Real).unwrap(), 4);
        assert_eq!(element_size(TypeTag::Logi).unwrap(), 4);
        assert_eq!(element_size(TypeTag::Doub).unwrap(), 8);
        assert_eq!(element_size(TypeTag::Char).unwrap(), 8);
        assert_eq!(element_size(TypeTag::Mess).unwrap(), 0);
        assert!(matches!(element_size(TypeTag::X231), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn capacities_follow_category() {
        for tag in TypeTag::all() {
            let expected = match tag.category() {
                Category::FixedString => BLOCK_SIZE_STRING,
                _ => BLOCK_SIZE_NUMERIC,
            };
            assert_eq!(block_capacity(tag), expected, "{tag}");
        }
        assert_eq!(block_capacity(TypeTag::Char), 105);
        assert_eq!(block_capacity(TypeTag::Doub), 1000);
    }

    #[test]
    fn from_str_rejects_wrong_length() {
        assert!(matches!("CHA".parse::<TypeTag>(), Err(Error::UnknownTag { tag }) if &tag == b"CHA "));
        assert!("CHARS".parse::<TypeTag>().is_err());
    }
}
