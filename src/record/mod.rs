use std::marker::PhantomData;

use crate::encoding::{DatumReader, DatumWriter, Decode, Encode};

/// Converts typed records to and from their schema-conformant binary form.
///
/// The container never looks inside a record: it only needs the schema text
/// for the header and the ability to encode one value at the end of a block
/// buffer, or decode one value from a cursor into a decompressed block.
pub trait RecordCodec {
    type Record;

    fn schema(&self) -> &str;

    fn serialize(&self, record: &Self::Record, dw: &mut DatumWriter) -> anyhow::Result<()>;

    fn deserialize(&self, dr: &mut DatumReader<'_>) -> anyhow::Result<Self::Record>;
}

/// A `RecordCodec` for any type that knows its own binary encoding, paired
/// with the schema text that describes it.
#[derive(Debug)]
pub struct SchemaCodec<T> {
    schema: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SchemaCodec<T> {
    fn clone(&self) -> Self {
        SchemaCodec {
            schema: self.schema.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> SchemaCodec<T>
where
    T: Encode + Decode,
{
    pub fn new<S>(schema: S) -> Self
    where
        S: Into<String>,
    {
        SchemaCodec {
            schema: schema.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> RecordCodec for SchemaCodec<T>
where
    T: Encode + Decode,
{
    type Record = T;

    fn schema(&self) -> &str {
        &self.schema
    }

    fn serialize(&self, record: &T, dw: &mut DatumWriter) -> anyhow::Result<()> {
        record.encode(dw);
        Ok(())
    }

    fn deserialize(&self, dr: &mut DatumReader<'_>) -> anyhow::Result<T> {
        T::decode(dr)
    }
}
