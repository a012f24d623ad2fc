use std::{io::Read, iter::FusedIterator};

use tracing::debug;

use crate::{
    container::ContainerReader,
    encoding::DatumReader,
    error::{Error, Result},
    header::Header,
    record::RecordCodec,
};

pub struct SequentialReader<R: Read, C: RecordCodec> {
    reader: ContainerReader<R, C>,
    // Decompressed payload of the current block.
    block: Vec<u8>,
    offset: usize,
    // Records of the current block not yet decoded.
    remaining: usize,
    records_read: u64,
    exhausted: bool,
}

impl<R: Read, C: RecordCodec> SequentialReader<R, C> {
    pub fn new(reader: ContainerReader<R, C>) -> Self {
        SequentialReader {
            reader,
            block: Vec::new(),
            offset: 0,
            remaining: 0,
            records_read: 0,
            exhausted: false,
        }
    }

    pub fn header(&self) -> &Header {
        self.reader.header()
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Iterates the records that have not been read yet. There is no rewind:
    /// once the file is exhausted, every later iterator is empty.
    pub fn objects(&mut self) -> Objects<'_, R, C> {
        Objects { reader: self }
    }

    /// Returns the next record, or `None` at the end of the file. The first
    /// error ends the read.
    pub fn next_record(&mut self) -> Result<Option<C::Record>> {
        if self.exhausted {
            return Ok(None);
        }
        match self.advance() {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                debug!(records = self.records_read, "container exhausted");
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => {
                self.exhausted = true;
                Err(e)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<C::Record>> {
        loop {
            if self.remaining > 0 {
                let mut dr = DatumReader::at(&self.block, self.offset);
                let record = self.reader.decode(&mut dr)?;
                self.offset = dr.position();
                self.remaining -= 1;
                self.records_read += 1;
                return Ok(Some(record));
            }

            if self.offset < self.block.len() {
                return Err(Error::CorruptBlock(format!(
                    "{} bytes left after the last record of block {}",
                    self.block.len() - self.offset,
                    self.reader.blocks_read(),
                )));
            }

            // Blocks with no records are legal; keep going until one has some.
            match self.reader.next_block()? {
                None => return Ok(None),
                Some(block) => {
                    self.block = block.data;
                    self.offset = 0;
                    self.remaining = block.count;
                }
            }
        }
    }
}

/// Records of a [`SequentialReader`], in file order.
pub struct Objects<'r, R: Read, C: RecordCodec> {
    reader: &'r mut SequentialReader<R, C>,
}

impl<'r, R: Read, C: RecordCodec> Iterator for Objects<'r, R, C> {
    type Item = Result<C::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record().transpose()
    }
}

impl<'r, R: Read, C: RecordCodec> FusedIterator for Objects<'r, R, C> {}

impl<'r, R: Read, C: RecordCodec> IntoIterator for &'r mut SequentialReader<R, C> {
    type Item = Result<C::Record>;
    type IntoIter = Objects<'r, R, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects()
    }
}
