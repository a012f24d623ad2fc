pub mod reader;
pub mod writer;

// Typed access to a container file. A `ContainerWriter` pairs the block layer
// with a record codec so callers hand it records instead of encoded bytes; a
// `ContainerReader` does the reverse. Neither decides when blocks are cut:
// that policy belongs to the sequential writer built on top.

pub use reader::ContainerReader;
pub use writer::ContainerWriter;
