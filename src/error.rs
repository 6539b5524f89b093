//! Error types for schema handling, datum decoding and registry access

use thiserror::Error;

use crate::schema::AvroSchema;

/// Errors that can occur during schema operations
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Invalid schema format
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    /// Unsupported schema type
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),
    /// Schema parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors that can occur during decoding
///
/// `SchemaMismatch` and `UnknownSchemaType` come from schema resolution; every
/// other variant is a wire-level codec failure and is propagated unchanged.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Writer and reader schemas cannot be reconciled at some node
    #[error(
        "Schema mismatch: writer type '{}' cannot be read as '{}'",
        .writer.type_name(),
        .reader.type_name()
    )]
    SchemaMismatch {
        /// The writer node that failed to resolve
        writer: Box<AvroSchema>,
        /// The reader node it was resolved against
        reader: Box<AvroSchema>,
    },
    /// A schema node the decoder cannot dispatch on
    #[error("Cannot read unknown schema type: {0}")]
    UnknownSchemaType(String),
    /// Invalid Avro data
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Unexpected end of data
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// Invalid varint encoding
    #[error("Invalid varint encoding")]
    InvalidVarint,
    /// String is not valid UTF-8
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl DecodeError {
    /// Build a `SchemaMismatch` carrying copies of both offending nodes.
    pub fn mismatch(writer: &AvroSchema, reader: &AvroSchema) -> Self {
        DecodeError::SchemaMismatch {
            writer: Box::new(writer.clone()),
            reader: Box::new(reader.clone()),
        }
    }

    /// Whether this error came from schema resolution rather than the wire codec.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            DecodeError::SchemaMismatch { .. } | DecodeError::UnknownSchemaType(_)
        )
    }
}

/// Errors raised by schema registry clients
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry answered 404 for the requested resource
    #[error("Not found: {0}")]
    NotFound(String),
    /// Any other non-success response or connection failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// The response body did not have the expected shape
    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),
    /// The submitted schema could not be parsed
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RegistryError {
    /// Whether this is the recoverable "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }
}
