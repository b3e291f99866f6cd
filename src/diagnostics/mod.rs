//! Diagnostic harness
//!
//! Runs three checks in order against a running instance and its backend:
//! a direct backend read, `GET /api/content` and `GET /api/test`. Every check
//! runs even when an earlier one fails; the report passes only if all do.

use hyper::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::api::{CONTENT_PATH, TEST_PATH};
use crate::backend::BackendHandle;

pub const DIRECT_CONNECTION: &str = "Direct backend connection";
pub const CONTENT_API: &str = "Content API";
pub const TEST_API: &str = "Test API";

#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("Invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub error: Option<String>,
}

impl CheckResult {
    fn from_outcome(name: &'static str, outcome: Result<(), String>) -> Self {
        let result = Self {
            name,
            error: outcome.err(),
        };
        match &result.error {
            None => tracing::info!(check = name, "check passed"),
            Some(error) => tracing::warn!(check = name, %error, "check failed"),
        }
        result
    }

    pub const fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate of every check, in the order they ran
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub checks: Vec<CheckResult>,
}

impl DiagnosticReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(CheckResult::passed)
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            match &check.error {
                None => writeln!(f, "[PASS] {}", check.name)?,
                Some(error) => writeln!(f, "[FAIL] {}: {error}", check.name)?,
            }
        }
        let passed = self.checks.iter().filter(|c| c.passed()).count();
        write!(f, "{passed}/{} checks passed", self.checks.len())
    }
}

pub struct Harness {
    http: reqwest::Client,
    base_url: reqwest::Url,
    backend: BackendHandle,
    table: String,
}

impl Harness {
    pub fn new(
        base_url: &str,
        backend: BackendHandle,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DiagnoseError> {
        let base_url = reqwest::Url::parse(base_url).map_err(|e| DiagnoseError::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DiagnoseError::BaseUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            backend,
            table: table.into(),
        })
    }

    /// Run all checks sequentially
    pub async fn run(&self) -> DiagnosticReport {
        let direct = self.check_backend().await;
        let content = self.check_endpoint(CONTENT_PATH, evaluate_content).await;
        let test = self.check_endpoint(TEST_PATH, evaluate_test).await;

        DiagnosticReport {
            checks: vec![
                CheckResult::from_outcome(DIRECT_CONNECTION, direct),
                CheckResult::from_outcome(CONTENT_API, content),
                CheckResult::from_outcome(TEST_API, test),
            ],
        }
    }

    async fn check_backend(&self) -> Result<(), String> {
        let client = self.backend.as_ref().map_err(ToString::to_string)?;
        client
            .health_check(&self.table)
            .await
            .map_err(|e| e.to_string())
    }

    async fn check_endpoint(
        &self,
        path: &str,
        evaluate: fn(StatusCode, Result<Value, String>) -> Result<(), String>,
    ) -> Result<(), String> {
        let url = self.base_url.join(path).map_err(|e| e.to_string())?;
        tracing::debug!(%url, "requesting");

        let response = self.http.get(url).send().await.map_err(|e| e.to_string())?;
        // reqwest and hyper share the `http` crate's status type
        let status = response.status();
        let body = response.json::<Value>().await.map_err(|e| e.to_string());
        evaluate(status, body)
    }
}

/// The content endpoint passes on a 2xx JSON body
fn evaluate_content(status: StatusCode, body: Result<Value, String>) -> Result<(), String> {
    body?;
    if !status.is_success() {
        return Err(format!("API error: {status}"));
    }
    Ok(())
}

/// The test endpoint also has to report `success: true`
fn evaluate_test(status: StatusCode, body: Result<Value, String>) -> Result<(), String> {
    let body = body?;
    if !status.is_success() {
        return Err(format!("Test API error: {status}"));
    }
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    Err(body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("Test endpoint reported failure")
        .to_string())
}
