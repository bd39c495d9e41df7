//! Batch decoding of independent streams.
//!
//! One stream cannot be decoded in parallel: every record's framing fixes the
//! offset of the next.  Independent streams can, one task each.  With the
//! `parallel` feature the batch runs on Rayon's global pool; without it the
//! streams are decoded one after another.  Either way results come back in
//! input order, one `Result` per stream, so one bad file never hides the
//! others.

use std::io::Read;

use crate::error::Result;
use crate::io_stream::{decode_with, ReadOptions};
use crate::keyword::KeywordArray;

pub fn decode_many<R>(streams: Vec<R>, options: &ReadOptions) -> Vec<Result<Vec<KeywordArray>>>
where
    R: Read + Send,
{
    tracing::debug!(streams = streams.len(), "batch decode");

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        streams
            .into_par_iter()
            .map(|s| decode_with(s, options.clone()))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        streams
            .into_iter()
            .map(|s| decode_with(s, options.clone()))
            .collect()
    }
}
