use std::{io::Write, sync::Arc};

use tracing::debug;

use crate::{
    codec::BlockCodec,
    encoding::encode_long,
    error::{Error, Result},
    header::{Header, SyncMarker},
};

pub struct BlockWriter<'a, W: Write> {
    w: &'a mut W,
    header: Header,
    header_written: bool,
    codec: Arc<dyn BlockCodec>,
    buf: Vec<u8>,
    pending: usize,
    blocks_written: usize,
    bytes_written: u64,
    // Set once any write to `w` fails; the file is unusable after that.
    failed: bool,
}

impl<'a, W: Write> BlockWriter<'a, W> {
    pub fn new(w: &'a mut W, schema: &str, codec: Arc<dyn BlockCodec>) -> Self {
        Self {
            w,
            header: Header::new(schema, codec.name()),
            header_written: false,
            codec,
            buf: Vec::with_capacity(1024),
            pending: 0,
            blocks_written: 0,
            bytes_written: 0,
            failed: false,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn codec(&self) -> &dyn BlockCodec {
        self.codec.as_ref()
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    fn check_usable(&self) -> Result<()> {
        if self.failed {
            return Err(Error::InvalidState(
                "an earlier write failed; the file cannot be continued".into(),
            ));
        }
        Ok(())
    }

    fn check_header_pending(&self, what: &str) -> Result<()> {
        if self.header_written {
            return Err(Error::InvalidState(format!(
                "{} cannot change after the header is written",
                what
            )));
        }
        Ok(())
    }

    pub fn add_metadata(&mut self, key: &str, value: &[u8]) -> Result<()> {
        crate::header::check_user_key(key)?;
        self.check_usable()?;
        self.check_header_pending("metadata")?;
        self.header.insert_metadata(key.to_owned(), value.to_vec())
    }

    pub fn set_sync_marker(&mut self, marker: SyncMarker) -> Result<()> {
        self.check_usable()?;
        self.check_header_pending("sync marker")?;
        self.header.set_sync_marker(marker);
        Ok(())
    }

    /// Buffers one already-encoded record. Never flushes on its own.
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        self.check_usable()?;
        self.buf.extend(record);
        self.pending += 1;
        Ok(())
    }

    fn write_out(&mut self, data: &[u8]) -> Result<()> {
        if let Err(e) = self.w.write_all(data) {
            self.failed = true;
            return Err(e.into());
        }
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        match self.header.write(&mut *self.w) {
            Ok(n) => {
                self.bytes_written += n as u64;
                self.header_written = true;
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Compresses and writes every pending record as one block. Does nothing
    /// when no records are pending, so empty blocks are never written.
    pub fn flush(&mut self) -> Result<()> {
        self.check_usable()?;
        if self.pending == 0 {
            return Ok(());
        }
        self.write_header()?;

        let payload = self.codec.compress(&self.buf)?;
        let mut prefix = Vec::with_capacity(20);
        encode_long(self.pending as i64, &mut prefix);
        encode_long(payload.len() as i64, &mut prefix);

        self.write_out(&prefix)?;
        self.write_out(&payload)?;
        let sync = *self.header.sync_marker().as_bytes();
        self.write_out(&sync)?;

        debug!(
            records = self.pending,
            raw_bytes = self.buf.len(),
            payload_bytes = payload.len(),
            block = self.blocks_written,
            "flushed block"
        );

        self.blocks_written += 1;
        self.buf.clear();
        self.pending = 0;
        Ok(())
    }

    /// Flushes pending records, makes sure the header is on the stream even
    /// if no block was ever written, and flushes the underlying writer.
    pub fn finish(&mut self) -> Result<()> {
        self.flush()?;
        self.write_header()?;
        if let Err(e) = self.w.flush() {
            self.failed = true;
            return Err(e.into());
        }
        Ok(())
    }
}
