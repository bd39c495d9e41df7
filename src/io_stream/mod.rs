//! Streaming keyword engine: reader and writer.
//!
//! # Reader
//! [`KeywordReader`] walks a stream array by array.  Each array is one
//! 16-byte header record followed by body records holding at most
//! `block_capacity(type)` elements each; only the last body record may be
//! shorter.  The reader is a small state machine:
//!
//! ```text
//! ExpectHeader ──header──▶ ExpectBody ──last body──▶ ExpectHeader
//!      │  └──MESS / count 0──────────────────────────────▲
//!      └──EOF at boundary──▶ Finished          any error ──▶ Failed
//! ```
//!
//! `Finished` and `Failed` are terminal.  There is no resynchronisation after
//! an error; see [`crate::recovery`] for locating the last good boundary.
//!
//! # Writer
//! [`KeywordWriter`] is the structural inverse: header record, then the
//! values chunked at the type's block capacity, each record framed with
//! freshly computed markers.
//!
//! # Endianness
//! Everything on disk is big-endian.  Conversion happens once per body record
//! in [`crate::endian`].

use std::io::{Read, Write};

use crate::endian;
use crate::error::{Error, Result};
use crate::header::{decode_header, encode_header, ArrayHeader, HEADER_SIZE, NAME_LEN};
use crate::keyword::{latin1_decode, latin1_encode, KeywordArray, Values};
use crate::record::{read_block, write_block};
use crate::types::TypeTag;

/// Default upper bound on a single record payload: 16 MiB.
pub const DEFAULT_MAX_BLOCK_LEN: usize = 16 * 1024 * 1024;

/// On-disk value of a true `LOGI` element.
pub const LOGI_TRUE: i32 = -1;

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`KeywordReader`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Records declaring a larger payload are rejected before allocation.
    pub max_block_len: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self { max_block_len: DEFAULT_MAX_BLOCK_LEN }
    }
}

/// Configuration for [`KeywordWriter`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Space-pad names and string elements shorter than their field instead
    /// of rejecting them.
    pub pad_strings: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { pad_strings: true }
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    ExpectHeader,
    Finished,
    Failed,
}

pub struct KeywordReader<R: Read> {
    reader:  R,
    options: ReadOptions,
    state:   ReaderState,
    offset:  u64,
}

impl<R: Read> KeywordReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReadOptions::default())
    }

    pub fn with_options(reader: R, options: ReadOptions) -> Self {
        Self { reader, options, state: ReaderState::ExpectHeader, offset: 0 }
    }

    /// Bytes consumed by completed arrays.  Between calls this is always an
    /// array boundary.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.state == ReaderState::Finished
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read the next complete array.
    ///
    /// `Ok(None)` once the stream ends cleanly at an array boundary.  After
    /// any error the reader is poisoned and keeps returning `Ok(None)`.
    pub fn next_array(&mut self) -> Result<Option<KeywordArray>> {
        if self.state != ReaderState::ExpectHeader {
            return Ok(None);
        }
        match self.read_array() {
            Ok(Some((array, consumed))) => {
                self.offset += consumed;
                Ok(Some(array))
            }
            Ok(None) => {
                self.state = ReaderState::Finished;
                tracing::debug!(offset = self.offset, "end of keyword stream");
                Ok(None)
            }
            Err(e) => {
                self.state = ReaderState::Failed;
                tracing::debug!(offset = self.offset, error = %e, "keyword stream failed");
                Err(e)
            }
        }
    }

    fn read_array(&mut self) -> Result<Option<(KeywordArray, u64)>> {
        let max = self.options.max_block_len;
        let block = match read_block(&mut self.reader, max)? {
            Some(b) => b,
            None => return Ok(None),
        };
        let mut consumed = block.framed_len() as u64;

        let header = decode_header(&block.payload)?;
        let tag = header.resolve()?;
        let elem_size = tag.element_size()?;
        let count = header.count()?;
        let name = latin1_decode(&header.name);

        tracing::debug!(
            keyword = %name,
            type_tag = %tag,
            count,
            offset = self.offset,
            "array header"
        );

        if tag == TypeTag::Mess {
            if count != 0 {
                tracing::debug!(keyword = %name, count, "MESS array with non-zero count, no body read");
            }
            return Ok(Some((KeywordArray { name, values: Values::Mess { count } }, consumed)));
        }

        let capacity = tag.block_capacity();
        let mut values = Values::empty(tag, count.min(capacity))
            .ok_or(Error::Unsupported { tag: tag.to_bytes() })?;

        let mut remaining = count;
        while remaining > 0 {
            let mut block = read_block(&mut self.reader, max)?.ok_or(Error::Truncated {
                expected: remaining * elem_size,
                available: 0,
            })?;
            let n = remaining.min(capacity);
            let expected = n * elem_size;
            if block.payload.len() != expected {
                return Err(Error::BodyLengthMismatch {
                    keyword: name,
                    expected,
                    actual: block.payload.len(),
                });
            }
            append_body(&mut values, tag, &mut block.payload, elem_size)?;
            consumed += block.framed_len() as u64;
            remaining -= n;
            tracing::trace!(keyword = %name, elements = n, remaining, "array body");
        }

        Ok(Some((KeywordArray { name, values }, consumed)))
    }
}

impl<R: Read> Iterator for KeywordReader<R> {
    type Item = Result<KeywordArray>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_array().transpose()
    }
}

impl<R: Read> std::iter::FusedIterator for KeywordReader<R> {}

/// Decode one body record into `values`.  `bytes.len()` is a multiple of
/// `elem_size`, checked by the caller.
fn append_body(values: &mut Values, tag: TypeTag, bytes: &mut [u8], elem_size: usize) -> Result<()> {
    match values {
        Values::Inte(v) => endian::decode_i32s(bytes, v),
        Values::Real(v) => endian::decode_f32s(bytes, v),
        Values::Doub(v) => endian::decode_f64s(bytes, v),
        Values::Logi(v) => {
            let mut raw = Vec::with_capacity(bytes.len() / 4);
            endian::decode_i32s(bytes, &mut raw);
            v.extend(raw.into_iter().map(|x| x != 0));
        }
        Values::Char(items) | Values::Str { items, .. } => {
            endian::native_body(tag, bytes)?;
            items.extend(bytes.chunks_exact(elem_size).map(latin1_decode));
        }
        Values::Mess { .. } => {}
    }
    Ok(())
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct KeywordWriter<W: Write> {
    writer:  W,
    options: WriteOptions,
    /// Reused body buffer; one record at a time.
    scratch: Vec<u8>,
}

impl<W: Write> KeywordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, WriteOptions::default())
    }

    pub fn with_options(writer: W, options: WriteOptions) -> Self {
        Self { writer, options, scratch: Vec::new() }
    }

    /// Write one array: header record, then body records.
    pub fn write_array(&mut self, array: &KeywordArray) -> Result<()> {
        let tag = array.type_tag();
        let count = array.count();
        let count_field = i32::try_from(count).map_err(|_| Error::CountOverflow(count))?;

        let mut name = Vec::with_capacity(NAME_LEN);
        latin1_encode(&array.name, NAME_LEN, self.options.pad_strings, &mut name)
            .ok_or_else(|| Error::BadName(array.name.clone()))?;
        let mut name_field = [0u8; NAME_LEN];
        name_field.copy_from_slice(&name);

        let header = ArrayHeader::new(name_field, tag, count_field);
        let encoded: [u8; HEADER_SIZE] = encode_header(&header);
        write_block(&mut self.writer, &encoded)?;
        tracing::debug!(keyword = %array.name, type_tag = %tag, count, "wrote array header");

        let capacity = tag.block_capacity();
        match &array.values {
            Values::Inte(v) => {
                for chunk in v.chunks(capacity) {
                    self.scratch.clear();
                    endian::encode_i32s(chunk, &mut self.scratch);
                    write_block(&mut self.writer, &self.scratch)?;
                }
            }
            Values::Real(v) => {
                for chunk in v.chunks(capacity) {
                    self.scratch.clear();
                    endian::encode_f32s(chunk, &mut self.scratch);
                    write_block(&mut self.writer, &self.scratch)?;
                }
            }
            Values::Doub(v) => {
                for chunk in v.chunks(capacity) {
                    self.scratch.clear();
                    endian::encode_f64s(chunk, &mut self.scratch);
                    write_block(&mut self.writer, &self.scratch)?;
                }
            }
            Values::Logi(v) => {
                for chunk in v.chunks(capacity) {
                    let raw: Vec<i32> =
                        chunk.iter().map(|&b| if b { LOGI_TRUE } else { 0 }).collect();
                    self.scratch.clear();
                    endian::encode_i32s(&raw, &mut self.scratch);
                    write_block(&mut self.writer, &self.scratch)?;
                }
            }
            Values::Char(items) | Values::Str { items, .. } => {
                let width = tag.element_size()?;
                for chunk in items.chunks(capacity) {
                    self.scratch.clear();
                    for item in chunk {
                        latin1_encode(item, width, self.options.pad_strings, &mut self.scratch)
                            .ok_or_else(|| Error::BadString {
                                keyword: array.name.clone(),
                                value:   item.clone(),
                            })?;
                    }
                    write_block(&mut self.writer, &self.scratch)?;
                }
            }
            Values::Mess { .. } => {}
        }
        Ok(())
    }

    pub fn write_all(&mut self, arrays: &[KeywordArray]) -> Result<()> {
        for array in arrays {
            self.write_array(array)?;
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

// ── Top-level API ────────────────────────────────────────────────────────────

/// Decode every array in `reader`, in stream order.
pub fn decode<R: Read>(reader: R) -> Result<Vec<KeywordArray>> {
    decode_with(reader, ReadOptions::default())
}

pub fn decode_with<R: Read>(reader: R, options: ReadOptions) -> Result<Vec<KeywordArray>> {
    KeywordReader::with_options(reader, options).collect()
}

pub fn decode_bytes(bytes: &[u8]) -> Result<Vec<KeywordArray>> {
    decode(bytes)
}

/// Encode `arrays` into a fresh buffer.
pub fn encode(arrays: &[KeywordArray]) -> Result<Vec<u8>> {
    encode_into(Vec::new(), arrays)
}

pub fn encode_into<W: Write>(writer: W, arrays: &[KeywordArray]) -> Result<W> {
    encode_with(writer, arrays, WriteOptions::default())
}

pub fn encode_with<W: Write>(writer: W, arrays: &[KeywordArray], options: WriteOptions) -> Result<W> {
    let mut w = KeywordWriter::with_options(writer, options);
    w.write_all(arrays)?;
    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StrWidth, BLOCK_SIZE_NUMERIC, BLOCK_SIZE_STRING};

    fn header_record(name: &[u8; 8], count: i32, tag: &[u8; 4]) -> Vec<u8> {
        let mut v = 16i32.to_be_bytes().to_vec();
        v.extend_from_slice(name);
        v.extend_from_slice(&count.to_be_bytes());
        v.extend_from_slice(tag);
        v.extend_from_slice(&16i32.to_be_bytes());
        v
    }

    fn body_record(payload: &[u8]) -> Vec<u8> {
        let len = payload.len() as i32;
        let mut v = len.to_be_bytes().to_vec();
        v.extend_from_slice(payload);
        v.extend_from_slice(&len.to_be_bytes());
        v
    }

    /// Payload lengths of every record in `wire`, in order.
    fn record_lengths(wire: &[u8]) -> Vec<usize> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < wire.len() {
            let head = i32::from_be_bytes(wire[pos..pos + 4].try_into().unwrap());
            let len = head as usize;
            let tail = i32::from_be_bytes(wire[pos + 4 + len..pos + 8 + len].try_into().unwrap());
            assert_eq!(head, tail);
            out.push(len);
            pos += len + 8;
        }
        out
    }

    #[test]
    fn dimens_integers() {
        let mut wire = header_record(b"DIMENS  ", 3, b"INTE");
        wire.extend(body_record(&[0, 0, 0, 10, 0, 0, 0, 20, 0, 0, 0, 5]));

        let arrays = decode_bytes(&wire).unwrap();
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays[0].name, "DIMENS  ");
        assert_eq!(arrays[0].values, Values::Inte(vec![10, 20, 5]));
        assert_eq!(encode(&arrays).unwrap(), wire);
    }

    #[test]
    fn mess_has_no_body() {
        let mut wire = header_record(b"STARTSOL", 0, b"MESS");
        wire.extend(header_record(b"ENDSOL  ", 0, b"MESS"));

        let arrays = decode_bytes(&wire).unwrap();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0].values, Values::Mess { count: 0 });
        assert_eq!(arrays[1].keyword(), "ENDSOL");
    }

    #[test]
    fn mess_with_count_keeps_count_and_reads_no_body() {
        let mut wire = header_record(b"STARTSOL", 5, b"MESS");
        wire.extend(header_record(b"DIMENS  ", 1, b"INTE"));
        wire.extend(body_record(&[0, 0, 0, 9]));

        let arrays = decode_bytes(&wire).unwrap();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0].values, Values::Mess { count: 5 });
        assert_eq!(arrays[0].count(), 5);
        assert!(arrays[0].values.is_empty());
        assert_eq!(arrays[1].values, Values::Inte(vec![9]));
        assert_eq!(encode(&arrays).unwrap(), wire);
    }

    #[test]
    fn negative_count_fails_stream() {
        let mut wire = header_record(b"SEQNUM  ", 1, b"INTE");
        wire.extend(body_record(&[0, 0, 0, 1]));
        wire.extend(header_record(b"DIMENS  ", -1, b"INTE"));

        let err = decode_bytes(&wire).unwrap_err();
        assert!(matches!(err, Error::NegativeCount { count: -1, .. }));
        assert!(err.is_format());

        let mut reader = KeywordReader::new(wire.as_slice());
        assert_eq!(reader.next_array().unwrap().unwrap().keyword(), "SEQNUM");
        assert!(reader.next_array().is_err());
        assert!(reader.next_array().unwrap().is_none());
    }

    #[test]
    fn header_head_tail_mismatch_fails_before_body() {
        let mut wire = header_record(b"DIMENS  ", 1, b"INTE");
        let n = wire.len();
        wire[n - 4..].copy_from_slice(&17i32.to_be_bytes());
        wire.extend(body_record(&[0, 0, 0, 1]));

        let err = decode_bytes(&wire).unwrap_err();
        assert!(matches!(err, Error::HeadTailMismatch { head: 16, tail: 17 }));
    }

    #[test]
    fn real_at_twice_capacity_uses_two_blocks() {
        let values: Vec<f32> = (0..2 * BLOCK_SIZE_NUMERIC).map(|i| i as f32 * 0.5).collect();
        let arrays = vec![KeywordArray::new("PRESSURE", Values::Real(values))];
        let wire = encode(&arrays).unwrap();
        assert_eq!(record_lengths(&wire), [16, 4000, 4000]);
        assert_eq!(decode_bytes(&wire).unwrap(), arrays);
    }

    #[test]
    fn fixed_width_strings_pass_through() {
        let mut wire = header_record(b"ZONES   ", 2, b"C003");
        wire.extend(body_record(b"ABCXYZ"));

        let arrays = decode_bytes(&wire).unwrap();
        let width = StrWidth::new(3).unwrap();
        assert_eq!(
            arrays[0].values,
            Values::Str { width, items: vec!["ABC".into(), "XYZ".into()] }
        );
    }

    #[test]
    fn clean_end_at_boundary_keeps_arrays() {
        let mut wire = header_record(b"DIMENS  ", 1, b"INTE");
        wire.extend(body_record(&[0, 0, 0, 7]));

        let mut reader = KeywordReader::new(wire.as_slice());
        let first = reader.next_array().unwrap().unwrap();
        assert_eq!(first.values, Values::Inte(vec![7]));
        assert_eq!(reader.offset(), wire.len() as u64);
        assert!(reader.next_array().unwrap().is_none());
        assert!(reader.is_finished());
    }

    #[test]
    fn truncation_mid_body_is_an_error() {
        let mut wire = header_record(b"DIMENS  ", 2000, b"INTE");
        wire.extend(body_record(&vec![0u8; 4000]));

        let err = decode_bytes(&wire).unwrap_err();
        assert!(matches!(err, Error::Truncated { expected: 4000, available: 0 }));
    }

    #[test]
    fn short_body_block_is_length_mismatch() {
        let mut wire = header_record(b"DIMENS  ", 3, b"INTE");
        wire.extend(body_record(&[0, 0, 0, 1, 0, 0, 0, 2]));

        let err = decode_bytes(&wire).unwrap_err();
        assert!(matches!(err, Error::BodyLengthMismatch { expected: 12, actual: 8, .. }));
    }

    #[test]
    fn bad_header_length() {
        let wire = body_record(&[0u8; 12]);
        assert!(matches!(decode_bytes(&wire), Err(Error::BadHeaderLength(12))));
    }

    #[test]
    fn unknown_and_unsupported_tags() {
        let wire = header_record(b"ODD     ", 1, b"C0AA");
        assert!(matches!(decode_bytes(&wire), Err(Error::UnknownTag { tag }) if &tag == b"C0AA"));

        let wire = header_record(b"ODD     ", 1, b"X231");
        assert!(matches!(decode_bytes(&wire), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn reader_is_fused_after_error() {
        let mut wire = header_record(b"ODD     ", 1, b"????");
        wire.extend(header_record(b"DIMENS  ", 0, b"INTE"));

        let mut reader = KeywordReader::new(wire.as_slice());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
        assert!(!reader.is_finished());
    }

    #[test]
    fn duplicates_keep_stream_order() {
        let arrays = vec![
            KeywordArray::new("SEQNUM", Values::Inte(vec![1])),
            KeywordArray::new("PARAMS", Values::Doub(vec![0.25])),
            KeywordArray::new("SEQNUM", Values::Inte(vec![2])),
        ];
        let decoded = decode_bytes(&encode(&arrays).unwrap()).unwrap();
        assert_eq!(decoded, arrays);
    }

    #[test]
    fn string_chunks_at_string_capacity() {
        let items: Vec<String> = (0..BLOCK_SIZE_STRING + 1).map(|i| format!("W{i:<7}")).collect();
        let arrays = vec![KeywordArray::new("WGNAMES", Values::Char(items))];
        let wire = encode(&arrays).unwrap();
        assert_eq!(record_lengths(&wire), [16, BLOCK_SIZE_STRING * 8, 8]);
        assert_eq!(decode_bytes(&wire).unwrap(), arrays);
    }

    #[test]
    fn logicals_encode_as_minus_one() {
        let arrays = vec![KeywordArray::new("LOGIHEAD", Values::Logi(vec![true, false]))];
        let wire = encode(&arrays).unwrap();
        assert_eq!(&wire[24..40], &[0, 0, 0, 8, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 8]);

        let mut raw = header_record(b"LOGIHEAD", 1, b"LOGI");
        raw.extend(body_record(&[0, 0, 0, 1]));
        assert_eq!(decode_bytes(&raw).unwrap()[0].values, Values::Logi(vec![true]));
    }

    #[test]
    fn writer_validates_strings() {
        let long_name = vec![KeywordArray { name: "TOOLONGNAME".into(), values: Values::Mess { count: 0 } }];
        assert!(matches!(encode(&long_name), Err(Error::BadName(_))));

        let width = StrWidth::new(2).unwrap();
        let long_item = vec![KeywordArray::new("X", Values::Str { width, items: vec!["ABC".into()] })];
        assert!(matches!(encode(&long_item), Err(Error::BadString { .. })));

        let short_item = vec![KeywordArray::new("X", Values::Str { width, items: vec!["A".into()] })];
        let strict = WriteOptions { pad_strings: false };
        assert!(matches!(encode_with(Vec::new(), &short_item, strict), Err(Error::BadString { .. })));
        let padded = decode_bytes(&encode(&short_item).unwrap()).unwrap();
        assert_eq!(padded[0].values.as_strings().unwrap()[0], "A ");
    }

    #[test]
    fn oversized_record_rejected_by_options() {
        let arrays = vec![KeywordArray::new("BIG", Values::Doub(vec![1.0; 10]))];
        let wire = encode(&arrays).unwrap();
        let err = decode_with(wire.as_slice(), ReadOptions { max_block_len: 64 }).unwrap_err();
        assert!(matches!(err, Error::BlockTooLarge { size: 80, max: 64 }));
    }
}
