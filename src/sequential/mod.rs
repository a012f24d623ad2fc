pub mod reader;
pub mod writer;

// Streaming, forward-only sessions over a container file.
//
// A `SequentialWriter` decides when blocks are cut: it counts records since
// the last flush and flushes once the count reaches its sync interval, and it
// flushes the final partial block when it is closed or dropped.
//
// A `SequentialReader` walks every record of every block exactly once. Its
// cursor lives in the reader rather than in the iterator it hands out, so
// asking for the records a second time continues where the first pass
// stopped; after the end of the file that is an empty sequence.

pub use reader::{Objects, SequentialReader};
pub use writer::SequentialWriter;

#[cfg(test)]
mod fixtures;
