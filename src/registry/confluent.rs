//! Direct Confluent Schema Registry client.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::RegistryError;
use crate::schema::{fingerprint_hex, parse_schema, sha256_resolution_fingerprint};

use super::{schema_id_from, RegistryTransport, SchemaId, SchemaRegistry};

/// Registry client that forwards every call to the registry's REST API.
#[derive(Debug)]
pub struct ConfluentRegistry<T> {
    transport: T,
}

impl<T: RegistryTransport> ConfluentRegistry<T> {
    /// Create a client over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// Path segment identifying a schema by its resolution fingerprint.
pub(crate) fn fingerprint_of(schema: &str) -> Result<String, RegistryError> {
    let parsed = parse_schema(schema)?;
    Ok(fingerprint_hex(&sha256_resolution_fingerprint(&parsed)))
}

#[async_trait]
impl<T: RegistryTransport> SchemaRegistry for ConfluentRegistry<T> {
    async fn register(&self, subject: &str, schema: &str) -> Result<SchemaId, RegistryError> {
        let path = format!("/subjects/{}/versions", subject);
        let data = self
            .transport
            .post(&path, json!({ "schema": schema }), &[200])
            .await?;
        let id = schema_id_from(&data)?;
        debug!(subject = %subject, id = %id, "Registry accepted schema");
        Ok(id)
    }

    async fn lookup_subject_schema(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<SchemaId, RegistryError> {
        let fingerprint = fingerprint_of(schema)?;
        let path = format!("/subjects/{}/fingerprints/{}", subject, fingerprint);
        let data = self.transport.get(&path).await?;
        schema_id_from(&data)
    }

    async fn compatible(
        &self,
        subject: &str,
        schema: &str,
        version: &str,
        params: &Map<String, Value>,
    ) -> Result<bool, RegistryError> {
        let path = format!("/compatibility/subjects/{}/versions/{}", subject, version);

        let mut body = Map::new();
        body.insert("schema".to_string(), Value::String(schema.to_string()));
        for (key, value) in params {
            body.insert(key.clone(), value.clone());
        }

        let data = self
            .transport
            .post(&path, Value::Object(body), &[200, 404])
            .await?;

        if data.get("error_code").is_some() {
            debug!(subject = %subject, version = %version, response = %data, "Compatibility check returned an error code");
            return Ok(false);
        }
        Ok(data
            .get("is_compatible")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}
