// Block compression. Every block payload in a file goes through the codec
// named by the header's `avro.codec` entry; records inside a block are never
// compressed individually.

use std::{
    collections::HashMap,
    io::{Read, Write},
    str::FromStr,
    sync::Arc,
};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub trait BlockCodec: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    #[default]
    Null,
    // Raw deflate (RFC 1951): no zlib or gzip framing around the stream.
    Deflate,
}

impl BlockCodec for Codec {
    fn name(&self) -> &str {
        match self {
            Codec::Null => "null",
            Codec::Deflate => "deflate",
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Null => Ok(data.to_vec()),
            Codec::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Codec::Null => Ok(data.to_vec()),
            Codec::Deflate => {
                let mut decompressed = Vec::new();
                DeflateDecoder::new(data)
                    .read_to_end(&mut decompressed)
                    .map_err(|e| Error::CorruptBlock(format!("deflate payload: {}", e)))?;
                Ok(decompressed)
            }
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "null" => Ok(Codec::Null),
            "deflate" => Ok(Codec::Deflate),
            _ => Err(Error::UnsupportedCodec(s.to_owned())),
        }
    }
}

/// Resolves the codec named in a file's header to an implementation.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn BlockCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry::empty();
        registry.register(Arc::new(Codec::Null));
        registry.register(Arc::new(Codec::Deflate));
        registry
    }
}

impl CodecRegistry {
    pub fn empty() -> Self {
        CodecRegistry {
            codecs: HashMap::new(),
        }
    }

    // Replaces any codec already registered under the same name.
    pub fn register(&mut self, codec: Arc<dyn BlockCodec>) {
        self.codecs.insert(codec.name().to_owned(), codec);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn BlockCodec>> {
        self.codecs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnsupportedCodec(name.to_owned()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
