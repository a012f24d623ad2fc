use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    codec::Codec,
    error::{Error, Result},
    header::check_user_key,
};

pub const DEFAULT_SYNC_INTERVAL: i64 = 24;

/// How a container is written. Stored and loaded as JSON, e.g.
///
/// ```json
/// { "codec": "deflate", "sync_interval": 1024, "metadata": { "origin": "ingest" } }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    pub codec: Codec,
    /// Records per block for a sequential writer; 0 and 1 both flush after
    /// every record.
    pub sync_interval: i64,
    /// Extra header entries, stored as UTF-8.
    pub metadata: BTreeMap<String, String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            codec: Codec::Null,
            sync_interval: DEFAULT_SYNC_INTERVAL,
            metadata: BTreeMap::new(),
        }
    }
}

impl WriterOptions {
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_sync_interval(mut self, sync_interval: i64) -> Self {
        self.sync_interval = sync_interval;
        self
    }

    pub fn with_metadata<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync_interval < 0 {
            return Err(Error::OutOfRange {
                name: "sync_interval",
                value: self.sync_interval,
            });
        }
        for key in self.metadata.keys() {
            check_user_key(key)?;
        }
        Ok(())
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(contents)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::WriterOptions;
    use crate::{codec::Codec, error::Error};

    #[test]
    fn test_defaults() {
        let options = WriterOptions::from_json("{}").unwrap();
        assert_eq!(WriterOptions::default(), options);
        assert_eq!(Codec::Null, options.codec);
        assert_eq!(24, options.sync_interval);
    }

    #[test]
    fn test_partial() {
        let options =
            WriterOptions::from_json(r#"{"codec": "deflate", "metadata": {"origin": "test"}}"#)
                .unwrap();
        assert_eq!(
            WriterOptions::default()
                .with_codec(Codec::Deflate)
                .with_metadata("origin", "test"),
            options
        );
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            WriterOptions::from_json(r#"{"sync_interval": -10}"#),
            Err(Error::OutOfRange { value: -10, .. })
        ));
        assert!(matches!(
            WriterOptions::from_json(r#"{"codec": "snappy"}"#),
            Err(Error::Options(_))
        ));
        assert!(matches!(
            WriterOptions::from_json(r#"{"metadata": {"avro.codec": "x"}}"#),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_load() {
        let options = WriterOptions::default()
            .with_codec(Codec::Deflate)
            .with_sync_interval(1024);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(options.to_json().unwrap().as_bytes())
            .unwrap();
        file.flush().unwrap();

        assert_eq!(options, WriterOptions::load(file.path()).unwrap());

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            WriterOptions::load(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
