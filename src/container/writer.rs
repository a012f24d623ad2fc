use std::{io::Write, sync::Arc};

use tracing::warn;

use crate::{
    block::BlockWriter,
    codec::BlockCodec,
    encoding::DatumWriter,
    error::{Error, Result},
    header::{check_user_key, Header, SyncMarker},
    options::WriterOptions,
    record::RecordCodec,
};

/// Writes records into a container file on a borrowed stream.
///
/// The header is written together with the first block, so metadata and the
/// sync marker can still be changed until then. Dropping the writer closes
/// it; call [`ContainerWriter::close`] to see any error from the final flush.
pub struct ContainerWriter<'a, W: Write, C: RecordCodec> {
    blocks: BlockWriter<'a, W>,
    codec: C,
    scratch: DatumWriter,
    records_written: u64,
    closed: bool,
}

impl<'a, W: Write, C: RecordCodec> ContainerWriter<'a, W, C> {
    /// Applies the codec and metadata of `options`. The sync interval is left
    /// to the sequential writer.
    pub fn new(w: &'a mut W, codec: C, options: &WriterOptions) -> Result<Self> {
        for key in options.metadata.keys() {
            check_user_key(key)?;
        }
        let mut writer = Self::with_block_codec(w, codec, Arc::new(options.codec));
        for (k, v) in &options.metadata {
            writer.add_metadata(k, v.as_bytes())?;
        }
        Ok(writer)
    }

    pub fn with_block_codec(w: &'a mut W, codec: C, block_codec: Arc<dyn BlockCodec>) -> Self {
        let blocks = BlockWriter::new(w, codec.schema(), block_codec);
        ContainerWriter {
            blocks,
            codec,
            scratch: DatumWriter::new(),
            records_written: 0,
            closed: false,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::InvalidState("container writer is closed".into()));
        }
        Ok(())
    }

    /// Encodes a record into the pending block.
    pub fn write(&mut self, record: &C::Record) -> Result<()> {
        self.check_open()?;
        self.scratch.clear();
        self.codec.serialize(record, &mut self.scratch)?;
        self.blocks.append(self.scratch.as_slice())?;
        self.records_written += 1;
        Ok(())
    }

    /// Writes the pending records as one block, if there are any.
    pub fn flush(&mut self) -> Result<()> {
        self.check_open()?;
        self.blocks.flush()
    }

    pub fn add_metadata(&mut self, key: &str, value: &[u8]) -> Result<()> {
        check_user_key(key)?;
        self.check_open()?;
        self.blocks.add_metadata(key, value)
    }

    pub fn set_sync_marker(&mut self, marker: SyncMarker) -> Result<()> {
        self.check_open()?;
        self.blocks.set_sync_marker(marker)
    }

    /// Flushes whatever is pending and finishes the file. Only the first call
    /// does anything, even if it fails.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.blocks.finish()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn header(&self) -> &Header {
        self.blocks.header()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn pending_count(&self) -> usize {
        self.blocks.pending_count()
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks.blocks_written()
    }

    pub fn bytes_written(&self) -> u64 {
        self.blocks.bytes_written()
    }
}

impl<'a, W: Write, C: RecordCodec> Drop for ContainerWriter<'a, W, C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close container writer on drop");
        }
    }
}
