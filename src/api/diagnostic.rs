// Diagnostic endpoint handler
// Reports explicit success/failure of a raw backend read

use chrono::{SecondsFormat, Utc};
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::backend::Query;
use crate::config::AppState;
use crate::http::{json_response, HttpResponse};

pub const CONNECTED: &str = "Successfully connected to backend";
pub const CONNECT_FAILED: &str = "Failed to connect to backend";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TestResponse {
    Success {
        success: bool,
        data: Vec<Value>,
        message: &'static str,
        timestamp: String,
    },
    Failure {
        success: bool,
        error: &'static str,
        details: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
    },
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `GET /api/test`: one-row read through the privileged client
pub async fn handle_test(state: &AppState) -> HttpResponse {
    let client = match &state.privileged {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "test endpoint: backend not configured");
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &TestResponse::Failure {
                    success: false,
                    error: INTERNAL_ERROR,
                    details: e.to_string(),
                    timestamp: Some(now()),
                },
            );
        }
    };

    let query = Query::new(state.config.backend.table.as_str()).limit(1);
    match client.select(&query).await {
        Ok(data) => {
            tracing::info!(rows = data.len(), tier = %client.tier(), "test endpoint: backend reachable");
            json_response(
                StatusCode::OK,
                &TestResponse::Success {
                    success: true,
                    data,
                    message: CONNECTED,
                    timestamp: now(),
                },
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "test endpoint: backend query failed");
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &TestResponse::Failure {
                    success: false,
                    error: CONNECT_FAILED,
                    details: e.to_string(),
                    timestamp: None,
                },
            )
        }
    }
}
