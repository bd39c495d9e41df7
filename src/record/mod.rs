//! Record framer: one length-prefixed, length-suffixed block.
//!
//! ```text
//! [ len : i32 BE ][ payload : len bytes ][ len : i32 BE ]
//! ```
//!
//! Both markers must agree.  End-of-stream is only clean when it falls
//! exactly where the next leading marker would start; anywhere else the
//! stream is truncated.

use std::io::{self, ErrorKind, Read, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::endian::{self, Width};
use crate::error::{Error, Result};

/// Size of one length marker.
pub const MARKER_SIZE: usize = 4;

/// One framed block.  Markers are checked on read and recomputed on write,
/// so only the payload survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub payload: Vec<u8>,
}

impl Block {
    /// Bytes this block occupies on disk, markers included.
    #[inline]
    pub fn framed_len(&self) -> usize {
        self.payload.len() + 2 * MARKER_SIZE
    }
}

/// Read the next block.
///
/// Returns `Ok(None)` when the stream ends before the first byte of a
/// leading marker.  `max_len` bounds the payload allocation.
pub fn read_block<R: Read>(reader: &mut R, max_len: usize) -> Result<Option<Block>> {
    let mut head = [0u8; MARKER_SIZE];
    match read_full(reader, &mut head)? {
        0 => return Ok(None),
        MARKER_SIZE => {}
        n => return Err(Error::Truncated { expected: MARKER_SIZE, available: n }),
    }
    let declared = marker_value(head)?;
    if declared < 0 {
        return Err(Error::NegativeLength(declared));
    }
    let len = declared as usize;
    if len > max_len {
        return Err(Error::BlockTooLarge { size: len, max: max_len });
    }

    let mut payload = vec![0u8; len];
    let got = read_full(reader, &mut payload)?;
    if got < len {
        return Err(Error::Truncated { expected: len, available: got });
    }

    let mut tail = [0u8; MARKER_SIZE];
    let got = read_full(reader, &mut tail)?;
    if got < MARKER_SIZE {
        return Err(Error::Truncated { expected: MARKER_SIZE, available: got });
    }
    let trailing = marker_value(tail)?;
    if trailing != declared {
        return Err(Error::HeadTailMismatch { head: declared, tail: trailing });
    }

    tracing::trace!(len, "read block");
    Ok(Some(Block { payload }))
}

/// Write `payload` framed by two identical markers.
pub fn write_block<W: Write>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = i32::try_from(payload.len()).map_err(|_| Error::BlockTooLarge {
        size: payload.len(),
        max:  i32::MAX as usize,
    })?;
    writer.write_i32::<BigEndian>(len)?;
    writer.write_all(payload)?;
    writer.write_i32::<BigEndian>(len)?;
    tracing::trace!(len, "wrote block");
    Ok(())
}

fn marker_value(raw: [u8; MARKER_SIZE]) -> Result<i32> {
    let mut host = [0u8; MARKER_SIZE];
    endian::to_host(&mut host, &raw, Width::Four, 1)?;
    Ok(i32::from_ne_bytes(host))
}

/// Fill `buf` as far as the stream allows; returns the bytes read, short only
/// at end-of-stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
