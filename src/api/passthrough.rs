// Backend REST passthrough
// `/api/<path>` reads that match no local route go to `<base>/rest/v1/<path>`

use http_body_util::Full;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};
use serde_json::json;

use crate::backend::Relayed;
use crate::config::AppState;
use crate::http::{json_response, HttpResponse};
use crate::logger;

/// Prefix rewritten onto the backend's REST root
pub const PREFIX: &str = "/api/";

/// Remainder after [`PREFIX`], if it names a relayable path.
/// Empty, `.` and `..` segments are refused.
pub fn relay_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(PREFIX)?;
    let relayable = !rest.is_empty()
        && rest
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."));
    relayable.then_some(rest)
}

pub async fn handle_passthrough(
    state: &AppState,
    rest: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> HttpResponse {
    let proxy = match &state.proxy {
        Ok(proxy) => proxy,
        Err(e) => {
            tracing::error!(error = %e, "passthrough unavailable");
            return json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "Backend not configured", "details": e.to_string() }),
            );
        }
    };

    match proxy.forward(rest, query, headers).await {
        Ok(relayed) => into_response(relayed),
        Err(e) => {
            tracing::warn!(path = rest, error = %e, code = ?e.code(), "passthrough failed");
            json_response(
                StatusCode::BAD_GATEWAY,
                &json!({ "error": "Backend unreachable", "details": e.to_string() }),
            )
        }
    }
}

fn into_response(relayed: Relayed) -> HttpResponse {
    let mut builder = Response::builder().status(relayed.status);
    if let Some(headers) = builder.headers_mut() {
        headers.extend(relayed.headers);
    }
    builder.body(Full::new(relayed.body)).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build relayed response: {e}"));
        json_response(
            StatusCode::BAD_GATEWAY,
            &json!({ "error": "Backend unreachable" }),
        )
    })
}
