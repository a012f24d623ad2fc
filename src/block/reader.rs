use std::{
    io::{self, Read},
    sync::Arc,
};

use tracing::debug;

use crate::{
    codec::{BlockCodec, CodecRegistry},
    encoding::{read_long, read_sized},
    error::{Error, Result},
    header::{Header, SYNC_SIZE},
};

use super::Block;

pub struct BlockReader<R: Read> {
    r: R,
    header: Header,
    codec: Arc<dyn BlockCodec>,
    blocks_read: usize,
}

impl<R: Read> BlockReader<R> {
    /// Parses and validates the header, then resolves the codec it names.
    pub fn open(mut r: R, registry: &CodecRegistry) -> Result<Self> {
        let header = Header::read(&mut r)?;
        let codec = registry.resolve(header.codec_name())?;
        Ok(BlockReader {
            r,
            header,
            codec,
            blocks_read: 0,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn codec(&self) -> &dyn BlockCodec {
        self.codec.as_ref()
    }

    pub fn blocks_read(&self) -> usize {
        self.blocks_read
    }

    pub fn into_inner(self) -> R {
        self.r
    }

    /// Reads the next block, or `None` if the stream ends cleanly where a
    /// block would begin. A partial block is corruption, not the end.
    pub fn next_block(&mut self) -> Result<Option<Block>> {
        let count = match read_long(&mut self.r) {
            Ok(None) => return Ok(None),
            Ok(Some(count)) => count,
            Err(e) => return Err(block_io("record count", e)),
        };
        let count = usize::try_from(count)
            .map_err(|_| Error::CorruptBlock(format!("negative record count {}", count)))?;

        let len = match read_long(&mut self.r) {
            Ok(Some(len)) => len,
            Ok(None) => return Err(Error::CorruptBlock("truncated payload length".into())),
            Err(e) => return Err(block_io("payload length", e)),
        };
        let len = u64::try_from(len)
            .map_err(|_| Error::CorruptBlock(format!("negative payload length {}", len)))?;

        let payload = read_sized(&mut self.r, len).map_err(|e| block_io("payload", e))?;

        let mut sync = [0_u8; SYNC_SIZE];
        self.r
            .read_exact(&mut sync)
            .map_err(|e| block_io("sync marker", e))?;
        if &sync != self.header.sync_marker().as_bytes() {
            return Err(Error::CorruptBlock(format!(
                "sync marker mismatch at block {}",
                self.blocks_read
            )));
        }

        let data = self.codec.decompress(&payload)?;
        debug!(
            records = count,
            payload_bytes = payload.len(),
            raw_bytes = data.len(),
            block = self.blocks_read,
            "read block"
        );
        self.blocks_read += 1;
        Ok(Some(Block { count, data }))
    }
}

fn block_io(what: &str, e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::CorruptBlock(format!("truncated {}", what)),
        io::ErrorKind::InvalidData => Error::CorruptBlock(format!("{}: {}", what, e)),
        _ => Error::Io(e),
    }
}
