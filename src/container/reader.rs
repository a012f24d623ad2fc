use std::io::Read;

use crate::{
    block::{Block, BlockReader},
    codec::{BlockCodec, CodecRegistry},
    encoding::DatumReader,
    error::Result,
    header::Header,
    record::RecordCodec,
};

/// Reads a container file whose header has been parsed and validated.
///
/// Records are decoded with the caller's record codec; the schema stored in
/// the file is available through [`ContainerReader::header`] but is not
/// reconciled with the codec's.
pub struct ContainerReader<R: Read, C: RecordCodec> {
    blocks: BlockReader<R>,
    codec: C,
}

impl<R: Read, C: RecordCodec> ContainerReader<R, C> {
    pub fn open(r: R, codec: C) -> Result<Self> {
        Self::open_with_registry(r, codec, &CodecRegistry::default())
    }

    pub fn open_with_registry(r: R, codec: C, registry: &CodecRegistry) -> Result<Self> {
        Ok(ContainerReader {
            blocks: BlockReader::open(r, registry)?,
            codec,
        })
    }

    pub fn header(&self) -> &Header {
        self.blocks.header()
    }

    pub fn block_codec(&self) -> &dyn BlockCodec {
        self.blocks.codec()
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn blocks_read(&self) -> usize {
        self.blocks.blocks_read()
    }

    pub fn next_block(&mut self) -> Result<Option<Block>> {
        self.blocks.next_block()
    }

    /// Decodes one record at the reader's position, advancing it.
    pub fn decode(&self, dr: &mut DatumReader<'_>) -> Result<C::Record> {
        Ok(self.codec.deserialize(dr)?)
    }

    pub fn into_inner(self) -> R {
        self.blocks.into_inner()
    }
}

#[cfg(test)]
mod test {
    use std::{io::Cursor, sync::Arc};

    use crate::{
        codec::{BlockCodec, Codec, CodecRegistry},
        container::{ContainerReader, ContainerWriter},
        encoding::DatumReader,
        error::{Error, Result},
        options::WriterOptions,
        record::{RecordCodec, SchemaCodec},
    };

    #[derive(Debug)]
    struct Xor;

    impl BlockCodec for Xor {
        fn name(&self) -> &str {
            "xor"
        }

        fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.iter().map(|b| b ^ 0x5a).collect())
        }

        fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
            self.compress(data)
        }
    }

    #[test]
    fn test_custom_codec() {
        let codec = SchemaCodec::<String>::new(r#""string""#);
        let mut data = Vec::new();
        let mut writer = ContainerWriter::with_block_codec(&mut data, codec.clone(), Arc::new(Xor));
        writer.write(&"hello".to_owned()).unwrap();
        writer.close().unwrap();
        drop(writer);

        assert!(matches!(
            ContainerReader::open(&data[..], codec.clone()),
            Err(Error::UnsupportedCodec(name)) if name == "xor"
        ));

        let mut registry = CodecRegistry::default();
        registry.register(Arc::new(Xor));
        let mut reader =
            ContainerReader::open_with_registry(Cursor::new(&data), codec, &registry).unwrap();
        assert_eq!("xor", reader.block_codec().name());
        let block = reader.next_block().unwrap().unwrap();
        let mut dr = DatumReader::new(&block.data);
        assert_eq!("hello", reader.decode(&mut dr).unwrap());
        assert!(dr.is_empty());

        let cursor = reader.into_inner();
        assert_eq!(data.len() as u64, cursor.position());
    }

    #[test]
    fn test_schema_is_exposed() {
        let mut data = Vec::new();
        let options = WriterOptions::default().with_codec(Codec::Deflate);
        ContainerWriter::new(&mut data, SchemaCodec::<i32>::new(r#""int""#), &options)
            .unwrap()
            .close()
            .unwrap();

        let reader = ContainerReader::open(&data[..], SchemaCodec::<i32>::new(r#""int""#)).unwrap();
        assert_eq!(r#""int""#, reader.header().schema().unwrap());
        assert_eq!(r#""int""#, reader.codec().schema());
    }
}
