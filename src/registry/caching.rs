//! Fingerprint-first registration decorator.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::CrosswindConfig;
use crate::error::RegistryError;

use super::confluent::fingerprint_of;
use super::{SchemaId, SchemaRegistry};

/// Wraps a registry so that `register` first asks whether the schema is
/// already known by its resolution fingerprint.
///
/// Ids found either way are remembered per `(subject, fingerprint)` for the
/// lifetime of the wrapper.
///
/// With `use_cacheable_schema_registration` off every call goes straight to
/// the wrapped registry.
pub struct CachingRegistry<R> {
    inner: R,
    config: CrosswindConfig,
    known: RwLock<HashMap<(String, String), SchemaId>>,
}

impl<R: SchemaRegistry> CachingRegistry<R> {
    /// Wrap `inner` using the registration switch from `config`.
    pub fn new(inner: R, config: CrosswindConfig) -> Self {
        Self {
            inner,
            config,
            known: RwLock::new(HashMap::new()),
        }
    }

    /// The wrapped registry.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of remembered `(subject, fingerprint)` ids.
    pub fn cached_len(&self) -> usize {
        self.known.read().len()
    }

    /// Forget all remembered ids.
    pub fn clear_cache(&self) {
        self.known.write().clear();
    }

    fn remember(&self, subject: &str, fingerprint: String, id: SchemaId) {
        self.known.write().insert((subject.to_string(), fingerprint), id);
    }
}

#[async_trait]
impl<R: SchemaRegistry> SchemaRegistry for CachingRegistry<R> {
    async fn register(&self, subject: &str, schema: &str) -> Result<SchemaId, RegistryError> {
        if !self.config.use_cacheable_schema_registration {
            return self.inner.register(subject, schema).await;
        }

        let fingerprint = fingerprint_of(schema)?;
        let key = (subject.to_string(), fingerprint);
        let cached = self.known.read().get(&key).copied();
        if let Some(id) = cached {
            debug!(subject = %subject, id = %id, "Schema id served from memo");
            return Ok(id);
        }
        let (_, fingerprint) = key;

        match self.inner.lookup_subject_schema(subject, schema).await {
            Ok(id) => {
                info!(subject = %subject, id = %id, fingerprint = %fingerprint, "Found schema");
                self.remember(subject, fingerprint, id);
                Ok(id)
            }
            Err(err) if err.is_not_found() => {
                let id = self.inner.register(subject, schema).await?;
                info!(subject = %subject, id = %id, fingerprint = %fingerprint, "Registered schema");
                self.remember(subject, fingerprint, id);
                Ok(id)
            }
            Err(err) => Err(err),
        }
    }

    async fn lookup_subject_schema(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<SchemaId, RegistryError> {
        self.inner.lookup_subject_schema(subject, schema).await
    }

    async fn compatible(
        &self,
        subject: &str,
        schema: &str,
        version: &str,
        params: &Map<String, Value>,
    ) -> Result<bool, RegistryError> {
        self.inner.compatible(subject, schema, version, params).await
    }
}
