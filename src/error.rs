use std::io;
use thiserror::Error;

/// Every way a keyword stream can fail to decode or encode.
///
/// All variants are fatal to the operation that produced them. Clean
/// end-of-stream at an array boundary is not an error and never shows up here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown type tag {}", show_tag(tag))]
    UnknownTag { tag: [u8; 4] },
    #[error("Type {} is recognised but not supported", show_tag(tag))]
    Unsupported { tag: [u8; 4] },
    #[error("Record head ({head}) != tail ({tail})")]
    HeadTailMismatch { head: i32, tail: i32 },
    #[error("Body block of '{keyword}' is {actual} bytes, expected {expected}")]
    BodyLengthMismatch { keyword: String, expected: usize, actual: usize },
    #[error("Stream truncated mid-record: needed {expected} bytes, got {available}")]
    Truncated { expected: usize, available: usize },
    #[error("Array header must be 16 bytes, got {0}")]
    BadHeaderLength(usize),
    #[error("Negative record length marker: {0}")]
    NegativeLength(i32),
    #[error("Negative element count {count} for '{keyword}'")]
    NegativeCount { keyword: String, count: i32 },
    #[error("Record of {size} bytes exceeds limit of {max}")]
    BlockTooLarge { size: usize, max: usize },
    #[error("Buffer of {actual} bytes does not fit {needed}")]
    BufferSize { needed: usize, actual: usize },
    #[error("Keyword name {0:?} cannot be encoded in 8 bytes")]
    BadName(String),
    #[error("String element {value:?} of '{keyword}' does not fit the array width")]
    BadString { keyword: String, value: String },
    #[error("Array of {0} elements exceeds the 32-bit count field")]
    CountOverflow(usize),
    #[error("Required keyword '{0}' not present")]
    MissingKeyword(String),
    #[error("Keyword '{keyword}' has type {found}, expected {expected}")]
    UnexpectedType { keyword: String, expected: String, found: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Framing and body-size violations: the bytes are there but disagree
    /// with themselves.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Error::HeadTailMismatch { .. }
                | Error::BodyLengthMismatch { .. }
                | Error::Truncated { .. }
                | Error::NegativeLength(_)
                | Error::BlockTooLarge { .. }
        )
    }

    /// Header and type-tag violations.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Error::UnknownTag { .. }
                | Error::Unsupported { .. }
                | Error::BadHeaderLength(_)
                | Error::NegativeCount { .. }
        )
    }
}

fn show_tag(tag: &[u8; 4]) -> String {
    if tag.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        format!("'{}'", tag.iter().map(|&b| b as char).collect::<String>())
    } else {
        format!("0x{:08x}", u32::from_be_bytes(*tag))
    }
}
