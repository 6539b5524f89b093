//! Schema registry clients
//!
//! [`ConfluentRegistry`] talks to a Confluent-compatible registry directly.
//! [`CachingRegistry`] wraps any [`SchemaRegistry`] and checks whether a
//! schema is already registered (by fingerprint) before registering it.

mod caching;
mod confluent;
mod transport;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::RegistryError;

pub use caching::CachingRegistry;
pub use confluent::ConfluentRegistry;
pub use transport::RegistryTransport;

/// Registry-assigned schema identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub u32);

impl SchemaId {
    /// Wrap a raw id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operations a schema registry client offers.
///
/// Schemas are passed as their JSON text, exactly as they are submitted to
/// the registry.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Register `schema` under `subject`, returning its id.
    async fn register(&self, subject: &str, schema: &str) -> Result<SchemaId, RegistryError>;

    /// Find the id of an already registered schema by its resolution fingerprint.
    ///
    /// # Errors
    /// `RegistryError::NotFound` if the subject has no such schema.
    async fn lookup_subject_schema(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<SchemaId, RegistryError>;

    /// Whether `schema` is compatible with `version` of `subject`.
    ///
    /// `params` are merged into the request body. A response carrying an
    /// `error_code` (for instance an unknown subject) answers `false`.
    async fn compatible(
        &self,
        subject: &str,
        schema: &str,
        version: &str,
        params: &Map<String, Value>,
    ) -> Result<bool, RegistryError>;
}

/// Pull the `id` field out of a registry response.
pub(crate) fn schema_id_from(data: &Value) -> Result<SchemaId, RegistryError> {
    data.get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(SchemaId::new)
        .ok_or_else(|| RegistryError::InvalidResponse(format!("Missing schema id in {}", data)))
}
