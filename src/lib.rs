//! Reading and writing object container files.
//!
//! A container file stores a sequence of records that share one schema. The
//! file starts with a header (magic bytes, a metadata map that carries the
//! schema and the block codec, and a random sync marker) followed by blocks of
//! records, each compressed as a unit and terminated by the sync marker.
//!
//! The crate is layered:
//!
//! - [`encoding`] has the varint and datum primitives both the framing and
//!   record codecs are built on.
//! - [`header`] and [`block`] put the header and blocks on a stream and take
//!   them off again.
//! - [`container`] pairs that framing with a [`RecordCodec`], which turns typed
//!   records into bytes.
//! - [`sequential`] decides when blocks are cut on the way out and walks every
//!   record on the way in.
//!
//! ```ignore
//! let codec = SchemaCodec::<String>::new(r#""string""#);
//! let options = WriterOptions::default().with_codec(Codec::Deflate);
//!
//! let mut data = Vec::new();
//! let writer = ContainerWriter::new(&mut data, codec.clone(), &options)?;
//! let mut writer = SequentialWriter::with_options(writer, &options)?;
//! writer.write(&"hello".to_owned())?;
//! writer.close()?;
//! drop(writer);
//!
//! let mut reader = SequentialReader::new(ContainerReader::open(&data[..], codec)?);
//! for record in reader.objects() {
//!     println!("{}", record?);
//! }
//! ```

pub mod block;
pub mod codec;
pub mod container;
pub mod encoding;
pub mod error;
pub mod header;
pub mod options;
pub mod record;
pub mod sequential;

pub use block::{Block, BlockReader, BlockWriter};
pub use codec::{BlockCodec, Codec, CodecRegistry};
pub use container::{ContainerReader, ContainerWriter};
pub use encoding::{DatumReader, DatumWriter, Decode, Encode};
pub use error::{Error, Result};
pub use header::{Header, SyncMarker};
pub use options::WriterOptions;
pub use record::{RecordCodec, SchemaCodec};
pub use sequential::{Objects, SequentialReader, SequentialWriter};
