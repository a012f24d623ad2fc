use std::io::Write;

use crate::{
    container::ContainerWriter,
    error::{Error, Result},
    options::WriterOptions,
    record::RecordCodec,
};

pub struct SequentialWriter<'a, W: Write, C: RecordCodec> {
    writer: ContainerWriter<'a, W, C>,
    // Records per block; always at least 1.
    sync_interval: usize,
    // Records written since the last flush.
    pending: usize,
}

impl<'a, W: Write, C: RecordCodec> SequentialWriter<'a, W, C> {
    /// Wraps a container writer, cutting a block every `sync_interval`
    /// records. Both 0 and 1 flush after every record; negative values are
    /// rejected.
    pub fn new(writer: ContainerWriter<'a, W, C>, sync_interval: i64) -> Result<Self> {
        let sync_interval = usize::try_from(sync_interval).map_err(|_| Error::OutOfRange {
            name: "sync_interval",
            value: sync_interval,
        })?;
        Ok(SequentialWriter {
            writer,
            sync_interval: sync_interval.max(1),
            pending: 0,
        })
    }

    pub fn with_options(
        writer: ContainerWriter<'a, W, C>,
        options: &WriterOptions,
    ) -> Result<Self> {
        Self::new(writer, options.sync_interval)
    }

    pub fn write(&mut self, record: &C::Record) -> Result<()> {
        self.writer.write(record)?;
        self.pending += 1;
        if self.pending >= self.sync_interval {
            self.flush()?;
        }
        Ok(())
    }

    /// Cuts a block now, regardless of the interval.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.pending = 0;
        Ok(())
    }

    pub fn add_metadata(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.writer.add_metadata(key, value)
    }

    /// Flushes the partial block, if any, and finishes the file. Later writes
    /// fail with `InvalidState`; later closes do nothing.
    pub fn close(&mut self) -> Result<()> {
        self.pending = 0;
        self.writer.close()
    }

    pub fn sync_interval(&self) -> usize {
        self.sync_interval
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn writer(&self) -> &ContainerWriter<'a, W, C> {
        &self.writer
    }
}
