// Record types shared by the round-trip and interop tests, each with the
// schema it is encoded against.

use std::collections::HashMap;

use crate::{
    encoding::{DatumReader, DatumWriter, Decode, Encode},
    record::SchemaCodec,
};

pub const CLASS_OF_INT: &str = r#"{"type":"record","name":"ClassOfInt","fields":[{"name":"PrimitiveInt","type":"int"}]}"#;

pub const NESTED_CLASS: &str = r#"{"type":"record","name":"NestedClass","fields":[{"name":"PrimitiveInt","type":"int"},{"name":"ClassOfIntReference","type":["null",{"type":"record","name":"ClassOfInt","fields":[{"name":"PrimitiveInt","type":"int"}]}]}]}"#;

pub const CONTAINING_DICTIONARY_CLASS: &str = r#"{"type":"record","name":"ContainingDictionaryClass","fields":[{"name":"Property","type":{"type":"map","values":"string"}}]}"#;

pub const CLASS_WITH_NULLABLE_INT_FIELD: &str = r#"{"type":"record","name":"ClassWithNullableIntField","fields":[{"name":"NullableIntField","type":["null","int"]}]}"#;

pub const SIMPLE_FLAT_CLASS: &str = r#"{"type":"record","name":"SimpleFlatClass","fields":[{"name":"StringField","type":"string"},{"name":"ByteArrayField","type":"bytes"},{"name":"ZeroByteArrayField","type":"bytes"}]}"#;

pub const CLASS_OF_LIST_OF_GUID: &str = r#"{"type":"record","name":"ClassOfListOfGuid","fields":[{"name":"ListOfGuid","type":{"type":"array","items":{"type":"fixed","name":"Guid","size":16}}}]}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOfInt {
    pub primitive_int: i32,
}

impl ClassOfInt {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(CLASS_OF_INT)
    }
}

impl Encode for ClassOfInt {
    fn encode(&self, dw: &mut DatumWriter) {
        self.primitive_int.encode(dw);
    }
}

impl Decode for ClassOfInt {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(ClassOfInt {
            primitive_int: i32::decode(dr)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedClass {
    pub primitive_int: i32,
    pub class_of_int_reference: Option<ClassOfInt>,
}

impl NestedClass {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(NESTED_CLASS)
    }
}

impl Encode for NestedClass {
    fn encode(&self, dw: &mut DatumWriter) {
        self.primitive_int.encode(dw);
        self.class_of_int_reference.encode(dw);
    }
}

impl Decode for NestedClass {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(NestedClass {
            primitive_int: i32::decode(dr)?,
            class_of_int_reference: Option::decode(dr)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainingDictionaryClass {
    pub property: HashMap<String, String>,
}

impl ContainingDictionaryClass {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(CONTAINING_DICTIONARY_CLASS)
    }
}

impl Encode for ContainingDictionaryClass {
    fn encode(&self, dw: &mut DatumWriter) {
        self.property.encode(dw);
    }
}

impl Decode for ContainingDictionaryClass {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(ContainingDictionaryClass {
            property: HashMap::decode(dr)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassWithNullableIntField {
    pub nullable_int_field: Option<i32>,
}

impl ClassWithNullableIntField {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(CLASS_WITH_NULLABLE_INT_FIELD)
    }
}

impl Encode for ClassWithNullableIntField {
    fn encode(&self, dw: &mut DatumWriter) {
        self.nullable_int_field.encode(dw);
    }
}

impl Decode for ClassWithNullableIntField {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(ClassWithNullableIntField {
            nullable_int_field: Option::decode(dr)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFlatClass {
    pub string_field: String,
    pub byte_array_field: Vec<u8>,
    pub zero_byte_array_field: Vec<u8>,
}

impl SimpleFlatClass {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(SIMPLE_FLAT_CLASS)
    }
}

// Vec<u8> would encode as an array of ints; these fields are `bytes`.
impl Encode for SimpleFlatClass {
    fn encode(&self, dw: &mut DatumWriter) {
        dw.write_string(&self.string_field);
        dw.write_bytes(&self.byte_array_field);
        dw.write_bytes(&self.zero_byte_array_field);
    }
}

impl Decode for SimpleFlatClass {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(SimpleFlatClass {
            string_field: dr.read_string()?,
            byte_array_field: dr.read_bytes()?.to_vec(),
            zero_byte_array_field: dr.read_bytes()?.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassOfListOfGuid {
    pub list_of_guid: Vec<[u8; 16]>,
}

impl ClassOfListOfGuid {
    pub fn codec() -> SchemaCodec<Self> {
        SchemaCodec::new(CLASS_OF_LIST_OF_GUID)
    }
}

impl Encode for ClassOfListOfGuid {
    fn encode(&self, dw: &mut DatumWriter) {
        self.list_of_guid.encode(dw);
    }
}

impl Decode for ClassOfListOfGuid {
    fn decode(dr: &mut DatumReader<'_>) -> anyhow::Result<Self> {
        Ok(ClassOfListOfGuid {
            list_of_guid: Vec::decode(dr)?,
        })
    }
}
