//! Avro datum decoding with writer/reader schema resolution
//!
//! This library decodes Avro binary values written under one schema into the
//! shape of another, recording which union member a record was resolved
//! into, and offers a schema registry client that registers schemas by
//! fingerprint lookup first.
//!
//! # Example
//! ```
//! use crosswind::{parse_schema, DatumReader};
//!
//! let writer = parse_schema(r#"{"type": "record", "name": "Point", "fields": [
//!     {"name": "x", "type": "int"}, {"name": "y", "type": "int"}]}"#).unwrap();
//! let reader = parse_schema(r#"["null", "string", {"type": "record", "name": "Point",
//!     "fields": [{"name": "y", "type": "long"}]}]"#).unwrap();
//!
//! let datum_reader = DatumReader::new(writer, reader);
//! let mut cursor: &[u8] = &[0x02, 0x04];
//! let value = datum_reader.read(&mut cursor).unwrap();
//!
//! assert_eq!(value.union_member_index(), Some(1));
//! assert_eq!(value.to_json()["y"], 2);
//! ```

pub mod config;
pub mod error;
pub mod reader;
pub mod registry;
pub mod schema;

// Re-export main types
pub use config::{CrosswindConfig, DecoderConfig};
pub use error::{DecodeError, RegistryError, SchemaError};
pub use reader::{decode, AvroValue, DatumReader, Record, UnionSeed, UNION_MEMBER_INDEX};
pub use registry::{
    CachingRegistry, ConfluentRegistry, RegistryTransport, SchemaId, SchemaRegistry,
};
pub use schema::{
    fingerprint_hex, matches, parse_schema, parsing_canonical_form, resolution_canonical_form,
    sha256_resolution_fingerprint, AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType,
    LogicalTypeName, RecordKind, RecordSchema, SchemaResolutionContext, TypePromotion,
};
