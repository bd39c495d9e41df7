use crate::endian::{self, Width};
use crate::error::{Error, Result};
use crate::types::TypeTag;

/// Fixed size of the header record payload.
pub const HEADER_SIZE: usize = 16;
/// Width of the keyword name field.
pub const NAME_LEN: usize = 8;

/// The 16-byte prologue of one keyword array.
///
/// ```text
/// [ name : 8 bytes ][ count : i32 BE ][ type tag : 4 ASCII bytes ]
/// ```
///
/// The tag is kept raw; [`ArrayHeader::resolve`] maps it through the type
/// registry so an unknown tag can still be reported with the keyword name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayHeader {
    pub name:     [u8; NAME_LEN],
    pub type_tag: [u8; 4],
    pub count:    i32,
}

impl ArrayHeader {
    pub fn new(name: [u8; NAME_LEN], tag: TypeTag, count: i32) -> Self {
        Self { name, type_tag: tag.to_bytes(), count }
    }

    pub fn resolve(&self) -> Result<TypeTag> {
        TypeTag::from_bytes(self.type_tag)
    }

    /// Declared count as a length.  Negative counts are malformed.
    pub fn count(&self) -> Result<usize> {
        usize::try_from(self.count).map_err(|_| Error::NegativeCount {
            keyword: self.name_lossy(),
            count:   self.count,
        })
    }

    /// Name with one `char` per byte, padding kept.
    pub fn name_lossy(&self) -> String {
        self.name.iter().map(|&b| b as char).collect()
    }
}

pub fn decode_header(payload: &[u8]) -> Result<ArrayHeader> {
    let payload: &[u8; HEADER_SIZE] = payload
        .try_into()
        .map_err(|_| Error::BadHeaderLength(payload.len()))?;

    let mut name = [0u8; NAME_LEN];
    name.copy_from_slice(&payload[..8]);

    let mut count = [0u8; 4];
    endian::to_host(&mut count, &payload[8..12], Width::Four, 1)?;

    let mut type_tag = [0u8; 4];
    type_tag.copy_from_slice(&payload[12..16]);

    Ok(ArrayHeader { name, type_tag, count: i32::from_ne_bytes(count) })
}

pub fn encode_header(header: &ArrayHeader) -> [u8; HEADER_SIZE] {
    let mut out = [0u8; HEADER_SIZE];
    out[..8].copy_from_slice(&header.name);
    out[8..12].copy_from_slice(&header.count.to_be_bytes());
    out[12..].copy_from_slice(&header.type_tag);
    out
}
