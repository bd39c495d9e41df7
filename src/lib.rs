pub mod error;
pub mod types;
pub mod endian;
pub mod record;
pub mod header;
pub mod keyword;
pub mod io_stream;
pub mod recovery;
pub mod summary;
pub mod perf;

pub use error::{Error, Result};
pub use types::{TypeTag, StrWidth, Category, resolve_tag};
pub use keyword::{KeywordArray, Values};
pub use io_stream::{KeywordReader, KeywordWriter, ReadOptions, WriteOptions, decode, decode_with, decode_bytes, encode, encode_into, encode_with};
pub use summary::SummarySpec;
