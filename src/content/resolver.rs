//! Content resolution
//!
//! Fetches the newest active content row, merges it over the defaults and
//! annotates the result. `resolve` always yields a usable document: backend
//! failures, empty tables, malformed rows and panics all degrade to the
//! defaults with an explanatory annotation.

use chrono::{SecondsFormat, Utc};
use futures::FutureExt;
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::merge::{merge_over, ContentDocument};
use super::DEBUG_KEY;
use crate::backend::{BackendError, BackendHandle, ConfigurationError, ContentRow, Query};

pub const NO_ACTIVE_CONTENT: &str = "No active content found in database";
pub const FETCH_FAILED: &str = "Failed to fetch content from database";

/// Why no override could be applied
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Query(#[from] BackendError),
    #[error("Malformed content row: {0}")]
    MalformedRow(#[source] serde_json::Error),
    #[error("{0}")]
    Panicked(String),
}

impl ResolveError {
    /// Short error class name reported in the annotation
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Query(_) => "BackendQueryError",
            Self::MalformedRow(_) => "MalformedRowError",
            Self::Panicked(_) => "Panic",
        }
    }

    /// HTTP status carried by the error itself, if any
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Configuration(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Query(_) | Self::MalformedRow(_) | Self::Panicked(_) => None,
        }
    }
}

/// Diagnostic sidecar attached under `_debug`. Never content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Annotation {
    Fetched {
        #[serde(rename = "fetchedAt")]
        fetched_at: String,
        #[serde(rename = "contentId")]
        content_id: Value,
    },
    NotFound {
        message: String,
        timestamp: String,
    },
    QueryFailed {
        error: String,
        details: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        timestamp: String,
    },
    Unconfigured {
        error: String,
        timestamp: String,
    },
    Unexpected {
        error: String,
        name: String,
        timestamp: String,
    },
}

/// Document returned to callers of the content endpoint
#[derive(Debug, Clone)]
pub struct ResolvedResponse {
    pub status: StatusCode,
    pub document: ContentDocument,
    pub annotation: Annotation,
}

impl ResolvedResponse {
    /// Document with the annotation stored under the reserved key
    pub fn into_body(self) -> Value {
        let mut document = self.document;
        let annotation = serde_json::to_value(&self.annotation).unwrap_or(Value::Null);
        document.insert(DEBUG_KEY.to_string(), annotation);
        Value::Object(document)
    }
}

pub struct ContentResolver {
    backend: BackendHandle,
    table: String,
    defaults: Arc<ContentDocument>,
}

impl ContentResolver {
    pub fn new(backend: BackendHandle, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            defaults: Arc::new(super::default_content().clone()),
        }
    }

    /// Replace the fallback document
    #[cfg(test)]
    #[must_use]
    pub fn with_defaults(mut self, defaults: ContentDocument) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Newest active row, at most one
    pub fn active_content_query(&self) -> Query {
        Query::new(self.table.as_str())
            .eq("is_active", true)
            .order("updated_at", true)
            .limit(1)
    }

    pub async fn resolve(&self) -> ResolvedResponse {
        let outcome = AssertUnwindSafe(self.fetch_active()).catch_unwind().await;

        match outcome {
            Ok(Ok(Some(row))) => {
                info!(content_id = %row.id, updated_at = ?row.updated_at, "serving active content");
                ResolvedResponse {
                    status: StatusCode::OK,
                    document: merge_over(&self.defaults, &row.content),
                    annotation: Annotation::Fetched {
                        fetched_at: now(),
                        content_id: row.id,
                    },
                }
            }
            Ok(Ok(None)) => {
                info!("no active content, serving defaults");
                self.fallback(
                    StatusCode::OK,
                    Annotation::NotFound {
                        message: NO_ACTIVE_CONTENT.to_string(),
                        timestamp: now(),
                    },
                )
            }
            Ok(Err(err)) => self.degrade(&err),
            Err(payload) => self.degrade(&ResolveError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    async fn fetch_active(&self) -> Result<Option<ContentRow>, ResolveError> {
        let client = self.backend.as_ref().map_err(Clone::clone)?;

        let rows = match client.select(&self.active_content_query()).await {
            Ok(rows) => rows,
            Err(e) if e.is_no_rows() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if rows.len() > 1 {
            return Err(BackendError::Ambiguous {
                expected: 1,
                actual: rows.len(),
            }
            .into());
        }

        rows.into_iter()
            .next()
            .map(|row| serde_json::from_value::<ContentRow>(row).map_err(ResolveError::MalformedRow))
            .transpose()
    }

    fn degrade(&self, err: &ResolveError) -> ResolvedResponse {
        let timestamp = now();
        let (status, annotation) = match err {
            ResolveError::Configuration(e) => {
                error!(error = %e, "content backend not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Annotation::Unconfigured {
                        error: e.to_string(),
                        timestamp,
                    },
                )
            }
            ResolveError::Query(e) => {
                warn!(
                    error = %e,
                    code = ?e.code(),
                    status = ?e.http_status(),
                    backend_details = ?e.details(),
                    "content query failed, serving defaults"
                );
                (
                    StatusCode::OK,
                    Annotation::QueryFailed {
                        error: FETCH_FAILED.to_string(),
                        details: e.to_string(),
                        code: e.code(),
                        timestamp,
                    },
                )
            }
            ResolveError::MalformedRow(_) | ResolveError::Panicked(_) => {
                error!(error = %err, "unexpected failure resolving content");
                (
                    err.status().unwrap_or(StatusCode::OK),
                    Annotation::Unexpected {
                        error: err.to_string(),
                        name: err.name().to_string(),
                        timestamp,
                    },
                )
            }
        };
        self.fallback(status, annotation)
    }

    fn fallback(&self, status: StatusCode, annotation: Annotation) -> ResolvedResponse {
        ResolvedResponse {
            status,
            document: (*self.defaults).clone(),
            annotation,
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}
