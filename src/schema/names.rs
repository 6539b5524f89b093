//! Named type registry.
//!
//! A schema tree defines each record, enum and fixed once; later uses are
//! [`AvroSchema::Named`] references. The context maps every fullname to its
//! single definition so the decoder can follow references (including
//! recursive ones) without copying or re-parsing.

use std::collections::HashMap;

use crate::error::DecodeError;
use crate::schema::AvroSchema;

/// Registry of named type definitions keyed by fully qualified name.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolutionContext {
    named_types: HashMap<String, AvroSchema>,
}

impl SchemaResolutionContext {
    /// Create a new empty resolution context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context by collecting every named definition in `schema`.
    pub fn build_from_schema(schema: &AvroSchema) -> Self {
        let mut context = Self::new();
        context.extract_named_types(schema);
        context
    }

    /// Register a named type in the context.
    pub fn register(&mut self, name: String, schema: AvroSchema) {
        self.named_types.insert(name, schema);
    }

    /// Get a named type from the context.
    pub fn get(&self, name: &str) -> Option<&AvroSchema> {
        self.named_types.get(name)
    }

    /// Check if a named type exists in the context.
    pub fn contains(&self, name: &str) -> bool {
        self.named_types.contains_key(name)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.named_types.len()
    }

    /// Whether no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.named_types.is_empty()
    }

    /// Follow a `Named` reference to its definition; any other node is returned as is.
    ///
    /// # Errors
    /// `DecodeError::UnknownSchemaType` if the name has no definition.
    pub fn resolve_ref<'a>(&'a self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, DecodeError> {
        match schema {
            AvroSchema::Named(name) => self
                .named_types
                .get(name)
                .ok_or_else(|| DecodeError::UnknownSchemaType(name.clone())),
            other => Ok(other),
        }
    }

    fn extract_named_types(&mut self, schema: &AvroSchema) {
        match schema {
            AvroSchema::Record(record) => {
                self.named_types.insert(record.fullname(), schema.clone());
                for field in &record.fields {
                    self.extract_named_types(&field.schema);
                }
            }
            AvroSchema::Enum(enum_schema) => {
                self.named_types.insert(enum_schema.fullname(), schema.clone());
            }
            AvroSchema::Fixed(fixed_schema) => {
                self.named_types.insert(fixed_schema.fullname(), schema.clone());
            }
            AvroSchema::Array(inner) | AvroSchema::Map(inner) => {
                self.extract_named_types(inner);
            }
            AvroSchema::Union(variants) => {
                for variant in variants {
                    self.extract_named_types(variant);
                }
            }
            AvroSchema::Logical(logical) => {
                // fixed-based logical types (decimal, duration) carry a name
                self.extract_named_types(&logical.base);
            }
            _ => {}
        }
    }
}
