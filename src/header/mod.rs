// The file header: magic, a metadata map, and the sync marker.
//
//   magic      4 bytes, "Obj" followed by the format version 1
//   metadata   map<bytes>: blocks of (string key, bytes value) pairs, each
//              block prefixed by its item count, terminated by a zero count
//   sync       16 random bytes, repeated after every data block
//
// The metadata must carry `avro.schema`; `avro.codec` names the block codec
// and means "null" when missing.

use std::{
    collections::BTreeMap,
    io::{self, Read, Write},
};

use rand::Rng;
use tracing::debug;

use crate::{
    encoding::{encode_long, read_long, read_sized, read_up_to},
    error::{Error, Result},
};

pub const MAGIC: [u8; 4] = [b'O', b'b', b'j', 1];
pub const SYNC_SIZE: usize = 16;

pub const SCHEMA_KEY: &str = "avro.schema";
pub const CODEC_KEY: &str = "avro.codec";
pub const RESERVED_PREFIX: &str = "avro.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncMarker(pub [u8; SYNC_SIZE]);

impl SyncMarker {
    pub fn random() -> Self {
        let mut bytes = [0_u8; SYNC_SIZE];
        rand::thread_rng().fill(&mut bytes);
        SyncMarker(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SYNC_SIZE] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    metadata: BTreeMap<String, Vec<u8>>,
    sync_marker: SyncMarker,
}

impl Header {
    pub fn new(schema: &str, codec_name: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(SCHEMA_KEY.to_owned(), schema.as_bytes().to_vec());
        metadata.insert(CODEC_KEY.to_owned(), codec_name.as_bytes().to_vec());
        Header {
            metadata,
            sync_marker: SyncMarker::random(),
        }
    }

    pub fn with_metadata<I, K, V>(schema: &str, codec_name: &str, extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let mut header = Header::new(schema, codec_name);
        for (k, v) in extra {
            header.insert_metadata(k.into(), v.into())?;
        }
        Ok(header)
    }

    /// Adds a user metadata entry. Keys must be non-empty and may not use the
    /// reserved `avro.` namespace.
    pub fn insert_metadata(&mut self, key: String, value: Vec<u8>) -> Result<()> {
        check_user_key(&key)?;
        self.metadata.insert(key, value);
        Ok(())
    }

    pub fn schema(&self) -> Result<&str> {
        let raw = self
            .get(SCHEMA_KEY)
            .ok_or_else(|| Error::CorruptHeader(format!("missing {}", SCHEMA_KEY)))?;
        std::str::from_utf8(raw)
            .map_err(|e| Error::CorruptHeader(format!("{} is not UTF-8: {}", SCHEMA_KEY, e)))
    }

    pub fn codec_name(&self) -> &str {
        self.get(CODEC_KEY)
            .and_then(|raw| std::str::from_utf8(raw).ok())
            .unwrap_or("null")
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.metadata.get(key).map(Vec::as_slice)
    }

    pub fn metadata(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.metadata
    }

    pub fn sync_marker(&self) -> SyncMarker {
        self.sync_marker
    }

    pub(crate) fn set_sync_marker(&mut self, marker: SyncMarker) {
        self.sync_marker = marker;
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend(MAGIC);
        // The schema and codec lead so the header reads naturally in a dump;
        // readers do not depend on the order.
        let leading = [SCHEMA_KEY, CODEC_KEY];
        let entries = leading
            .iter()
            .filter_map(|k| self.metadata.get_key_value(*k))
            .chain(
                self.metadata
                    .iter()
                    .filter(|(k, _)| !leading.contains(&k.as_str())),
            );
        if !self.metadata.is_empty() {
            encode_long(self.metadata.len() as i64, buf);
            for (k, v) in entries {
                encode_long(k.len() as i64, buf);
                buf.extend(k.as_bytes());
                encode_long(v.len() as i64, buf);
                buf.extend(v);
            }
        }
        encode_long(0, buf);
        buf.extend(self.sync_marker.as_bytes());
    }

    /// Writes the header, returning the number of bytes written.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<usize> {
        let mut buf = Vec::with_capacity(256);
        self.encode(&mut buf);
        w.write_all(&buf)?;
        debug!(
            bytes = buf.len(),
            codec = self.codec_name(),
            entries = self.metadata.len(),
            "wrote container header"
        );
        Ok(buf.len())
    }

    pub fn read<R: Read>(r: &mut R) -> Result<Self> {
        // Nothing else is trusted until the magic matches.
        let mut magic = [0_u8; 4];
        let n = read_up_to(r, &mut magic)?;
        if n < MAGIC.len() || magic != MAGIC {
            return Err(Error::CorruptHeader(format!(
                "bad magic {:02x?}",
                &magic[..n]
            )));
        }

        let mut metadata = BTreeMap::new();
        loop {
            let mut count = read_header_long(r, "metadata block count")?;
            if count == 0 {
                break;
            }
            if count < 0 {
                count = count
                    .checked_neg()
                    .ok_or_else(|| Error::CorruptHeader("metadata block count overflow".into()))?;
                read_header_long(r, "metadata block size")?;
            }
            for _ in 0..count {
                let key = read_header_bytes(r, "metadata key")?;
                let key = String::from_utf8(key)
                    .map_err(|e| Error::CorruptHeader(format!("metadata key is not UTF-8: {}", e)))?;
                let value = read_header_bytes(r, "metadata value")?;
                if metadata.insert(key.clone(), value).is_some() {
                    return Err(Error::CorruptHeader(format!(
                        "duplicate metadata key {:?}",
                        key
                    )));
                }
            }
        }

        let mut sync = [0_u8; SYNC_SIZE];
        r.read_exact(&mut sync).map_err(|e| header_io("sync marker", e))?;

        let header = Header {
            metadata,
            sync_marker: SyncMarker(sync),
        };
        let schema = header.schema()?;
        if let Err(e) = serde_json::from_str::<serde_json::Value>(schema) {
            return Err(Error::CorruptHeader(format!(
                "{} is not valid JSON: {}",
                SCHEMA_KEY, e
            )));
        }
        // Only a missing codec entry defaults to null; a damaged one is not
        // a codec name at all.
        if let Some(raw) = header.get(CODEC_KEY) {
            std::str::from_utf8(raw).map_err(|e| {
                Error::CorruptHeader(format!("{} is not UTF-8: {}", CODEC_KEY, e))
            })?;
        }
        debug!(
            codec = header.codec_name(),
            entries = header.metadata.len(),
            "read container header"
        );
        Ok(header)
    }
}

pub(crate) fn check_user_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("metadata key is empty".into()));
    }
    if key.starts_with(RESERVED_PREFIX) {
        return Err(Error::InvalidArgument(format!(
            "metadata key {:?} uses the reserved {:?} prefix",
            key, RESERVED_PREFIX
        )));
    }
    Ok(())
}

// Truncation and malformed varints inside the header are corruption; other
// I/O failures pass through untouched.
fn header_io(what: &str, e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::CorruptHeader(format!("truncated {}", what)),
        io::ErrorKind::InvalidData => Error::CorruptHeader(format!("{}: {}", what, e)),
        _ => Error::Io(e),
    }
}

fn read_header_long<R: Read>(r: &mut R, what: &str) -> Result<i64> {
    match read_long(r) {
        Ok(Some(v)) => Ok(v),
        Ok(None) => Err(Error::CorruptHeader(format!("truncated {}", what))),
        Err(e) => Err(header_io(what, e)),
    }
}

fn read_header_bytes<R: Read>(r: &mut R, what: &str) -> Result<Vec<u8>> {
    let len = read_header_long(r, what)?;
    let len = u64::try_from(len)
        .map_err(|_| Error::CorruptHeader(format!("{}: negative length {}", what, len)))?;
    read_sized(r, len).map_err(|e| header_io(what, e))
}
