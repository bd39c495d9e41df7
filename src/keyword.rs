//! Decoded keyword arrays.
//!
//! Strings (names and string elements) carry one `char` per on-disk byte
//! (ISO-8859-1).  ASCII content is unchanged and every byte sequence maps back
//! to itself on encode.

use serde::{Deserialize, Serialize};

use crate::header::NAME_LEN;
use crate::types::{StrWidth, TypeTag};

/// Typed element storage.  The variant fixes the on-disk type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "UPPERCASE")]
pub enum Values {
    Inte(Vec<i32>),
    Real(Vec<f32>),
    Doub(Vec<f64>),
    Logi(Vec<bool>),
    /// Legacy 8-byte strings.
    Char(Vec<String>),
    /// `C0NN` strings of `width` bytes.
    Str { width: StrWidth, items: Vec<String> },
    /// Zero-width marker; never has elements.  `count` is the header's
    /// element count, kept so a re-encode reproduces the header exactly.
    Mess { count: usize },
}

impl Values {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Values::Inte(_) => TypeTag::Inte,
            Values::Real(_) => TypeTag::Real,
            Values::Doub(_) => TypeTag::Doub,
            Values::Logi(_) => TypeTag::Logi,
            Values::Char(_) => TypeTag::Char,
            Values::Str { width, .. } => TypeTag::Str(*width),
            Values::Mess { .. } => TypeTag::Mess,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Values::Inte(v) => v.len(),
            Values::Real(v) => v.len(),
            Values::Doub(v) => v.len(),
            Values::Logi(v) => v.len(),
            Values::Char(v) => v.len(),
            Values::Str { items, .. } => items.len(),
            Values::Mess { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty storage for `tag`, or `None` for `X231`.
    pub fn empty(tag: TypeTag, capacity: usize) -> Option<Self> {
        let values = match tag {
            TypeTag::Inte => Values::Inte(Vec::with_capacity(capacity)),
            TypeTag::Real => Values::Real(Vec::with_capacity(capacity)),
            TypeTag::Doub => Values::Doub(Vec::with_capacity(capacity)),
            TypeTag::Logi => Values::Logi(Vec::with_capacity(capacity)),
            TypeTag::Char => Values::Char(Vec::with_capacity(capacity)),
            TypeTag::Str(width) => Values::Str { width, items: Vec::with_capacity(capacity) },
            TypeTag::Mess => Values::Mess { count: 0 },
            TypeTag::X231 => return None,
        };
        Some(values)
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            Values::Inte(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_reals(&self) -> Option<&[f32]> {
        match self {
            Values::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_doubles(&self) -> Option<&[f64]> {
        match self {
            Values::Doub(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bools(&self) -> Option<&[bool]> {
        match self {
            Values::Logi(v) => Some(v),
            _ => None,
        }
    }

    /// String elements of either `CHAR` or `C0NN` arrays, padding kept.
    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            Values::Char(v) | Values::Str { items: v, .. } => Some(v),
            _ => None,
        }
    }
}

/// One named, typed array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordArray {
    /// Eight characters, space padded.
    pub name:   String,
    pub values: Values,
}

impl KeywordArray {
    /// Build an array, space-padding `name` to eight characters.
    pub fn new(name: &str, values: Values) -> Self {
        Self { name: format!("{:<width$}", name, width = NAME_LEN), values }
    }

    /// Name without trailing padding.
    pub fn keyword(&self) -> &str {
        self.name.trim_end()
    }

    pub fn type_tag(&self) -> TypeTag {
        self.values.type_tag()
    }

    /// Element count as written in the header.  Equal to `values.len()`
    /// except for `MESS`, which stores its header count without elements.
    pub fn count(&self) -> usize {
        match self.values {
            Values::Mess { count } => count,
            _ => self.values.len(),
        }
    }
}

// ── ISO-8859-1 helpers ───────────────────────────────────────────────────────

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode `s` into exactly `width` bytes, space padding when `pad` is set.
/// `None` if `s` is too long, too short without padding, or holds characters
/// above U+00FF.
pub(crate) fn latin1_encode(s: &str, width: usize, pad: bool, out: &mut Vec<u8>) -> Option<()> {
    let start = out.len();
    for c in s.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(b) => out.push(b),
            Err(_) => {
                out.truncate(start);
                return None;
            }
        }
    }
    let written = out.len() - start;
    if written > width || (written < width && !pad) {
        out.truncate(start);
        return None;
    }
    out.resize(start + width, b' ');
    Some(())
}
