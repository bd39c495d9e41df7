//! Boundary scanner: find the last known-good array boundary.
//!
//! Decoding is all-or-nothing per stream.  A caller that wants the good
//! prefix of a damaged file scans it first, truncates the stream at
//! [`ScanReport::good_len`] and decodes again.  The scanner never skips over
//! damage or resynchronises; it stops at the first error and reports it.

use std::io::Read;

use serde::Serialize;

use crate::error::Error;
use crate::io_stream::{KeywordReader, ReadOptions};

/// One array that decoded completely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedArray {
    /// Byte offset of the array's header record.
    pub offset:   u64,
    pub name:     String,
    pub type_tag: String,
    pub count:    usize,
}

#[derive(Debug)]
pub struct ScanReport {
    pub arrays:   Vec<ScannedArray>,
    /// Offset just past the last complete array.
    pub good_len: u64,
    /// The error that stopped the scan, `None` if the stream ended cleanly.
    pub error:    Option<Error>,
}

impl ScanReport {
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

/// Walk `reader` to the end or to the first error.
pub fn scan<R: Read>(reader: R, options: ReadOptions) -> ScanReport {
    let mut kr = KeywordReader::with_options(reader, options);
    let mut arrays = Vec::new();

    let error = loop {
        let offset = kr.offset();
        match kr.next_array() {
            Ok(Some(array)) => arrays.push(ScannedArray {
                offset,
                name:     array.name.clone(),
                type_tag: array.type_tag().to_string(),
                count:    array.count(),
            }),
            Ok(None) => break None,
            Err(e) => break Some(e),
        }
    };

    let good_len = kr.offset();
    if let Some(e) = &error {
        tracing::info!(good_len, arrays = arrays.len(), error = %e, "scan stopped");
    }
    ScanReport { arrays, good_len, error }
}
