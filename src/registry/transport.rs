//! RegistryTransport trait definition
//!
//! The registry clients speak JSON over paths relative to the registry's base
//! URL. The HTTP client itself (connection pooling, retries, credentials) is
//! supplied by the caller through this trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryError;

/// JSON request/response channel to a schema registry.
///
/// Implementations map HTTP outcomes onto [`RegistryError`]:
/// - a 404 whose status is not listed in `expects` is `RegistryError::NotFound`
/// - any other non-success status or connection failure is `RegistryError::Transport`
/// - a status listed in `expects` returns its body, whatever it is
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// `GET path`, returning the decoded JSON body.
    async fn get(&self, path: &str) -> Result<Value, RegistryError>;

    /// `POST path` with a JSON body.
    ///
    /// `expects` lists the statuses whose bodies are returned instead of
    /// being turned into errors.
    async fn post(&self, path: &str, body: Value, expects: &[u16]) -> Result<Value, RegistryError>;
}

#[async_trait]
impl<T: RegistryTransport + ?Sized> RegistryTransport for Arc<T> {
    async fn get(&self, path: &str) -> Result<Value, RegistryError> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: Value, expects: &[u16]) -> Result<Value, RegistryError> {
        (**self).post(path, body, expects).await
    }
}
