//! Hosted backend access
//!
//! A `BackendClient` reads rows from a named collection. The factory in
//! `factory` binds a REST client to a base URL and one of two credential
//! tiers, or reports a `ConfigurationError` when the settings are absent.

mod error;
mod factory;
#[cfg(test)]
pub mod memory;
mod proxy;
mod query;
mod rest;
#[cfg(test)]
pub mod stub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use error::{BackendError, ConfigurationError, NO_ROWS_CODE};
pub use factory::{connect, connect_with_token, ClientTier};
pub use proxy::{Relayed, RestProxy};
pub use query::Query;

/// Read access to backend collections
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Which credential tier this client authenticates with
    fn tier(&self) -> ClientTier;

    /// Run `query` and return the decoded rows
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Cheap connectivity probe against `table`
    async fn health_check(&self, table: &str) -> Result<(), BackendError> {
        self.select(&Query::new(table).select("id").limit(1))
            .await
            .map(|_| ())
    }
}

/// Outcome of client construction, checked at every call site
pub type BackendHandle = Result<Arc<dyn BackendClient>, ConfigurationError>;

/// Persisted landing page content row
///
/// Only `id` and `content` drive resolution. Everything else is audit
/// metadata and may be absent or null.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ContentRow {
    /// Primary key, passed through as stored (uuid string or integer)
    pub id: Value,
    /// Content document; expected to be a JSON object
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub updated_by: Option<Value>,
}
