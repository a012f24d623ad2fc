pub mod reader;
pub mod writer;

// This package reads and writes the data blocks of a container file.
//
// A container file is a header followed by zero or more blocks. Each block
// batches one or more encoded records, compresses them together with the
// file's codec, and is laid out as:
//
//   count    varint long, number of records in the block
//   length   varint long, byte length of the compressed payload
//   payload  `length` bytes
//   sync     the 16-byte marker from the header
//
// There is no end-of-file marker: the file ends where a block would otherwise
// begin. The header itself is only put on the stream when the first block is
// flushed (or when the writer finishes with no blocks), which is what lets
// metadata be added to a writer that has not produced output yet.

pub use reader::BlockReader;
pub use writer::BlockWriter;


/// One decompressed block: `count` records laid end to end in `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub count: usize,
    pub data: Vec<u8>,
}
