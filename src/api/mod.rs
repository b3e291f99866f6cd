//! Request routing and middleware
//!
//! Every request passes through [`handle_request`]: preflights are answered
//! before any handler runs, oversized bodies are rejected, and the header
//! composer stamps CORS headers on whatever response comes back.

mod content;
mod diagnostic;
mod health;
mod passthrough;

use hyper::body::Body;
use hyper::header::{HeaderMap, CONTENT_LENGTH};
use hyper::http::request::Parts;
use hyper::{Method, Request, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{AppState, HealthConfig};
use crate::http::{
    build_404_response, build_405_response, build_413_response, build_empty_response,
    HttpResponse,
};
use crate::logger::{self, AccessLogEntry};

pub const CONTENT_PATH: &str = "/api/content";
pub const TEST_PATH: &str = "/api/test";

const ALLOWED: &str = "GET, OPTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Content,
    Test,
    Liveness,
    Readiness,
}

fn match_route(path: &str, health: &HealthConfig) -> Option<Route> {
    match path {
        CONTENT_PATH => Some(Route::Content),
        TEST_PATH => Some(Route::Test),
        p if health.enabled && p == health.liveness_path => Some(Route::Liveness),
        p if health.enabled && p == health.readiness_path => Some(Route::Readiness),
        _ => None,
    }
}

/// Preflight status: the test endpoint answers 204, everything else 200
const fn preflight_status(route: Option<Route>) -> StatusCode {
    match route {
        Some(Route::Test) => StatusCode::NO_CONTENT,
        _ => StatusCode::OK,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let access_log = state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed);
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, peer_addr));

    let (parts, _body) = req.into_parts();
    let content_length = content_length(&parts.headers);

    let mut response = route_request(&parts, content_length, &state).await;
    state.composer.finish(&mut response);

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.complete(response.status(), body_bytes, started.elapsed());
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Parsed `Content-Length`, `None` when absent or unparseable
fn content_length(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(size) => Some(size),
        None => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: {value:?}, skipping size check"
            ));
            None
        }
    }
}

async fn route_request(
    parts: &Parts,
    content_length: Option<u64>,
    state: &AppState,
) -> HttpResponse {
    let method = &parts.method;
    let path = parts.uri.path();
    let route = match_route(path, &state.config.routes.health);

    // Preflight never reaches a handler
    if *method == Method::OPTIONS {
        return build_empty_response(preflight_status(route));
    }

    let max_body_size = state.config.http.max_body_size;
    if let Some(size) = content_length.filter(|size| *size > max_body_size) {
        logger::log_error(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return build_413_response();
    }

    let Some(route) = route else {
        let Some(rest) = passthrough::relay_path(path) else {
            return build_404_response(path);
        };
        if *method != Method::GET {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return build_405_response(ALLOWED);
        }
        return passthrough::handle_passthrough(state, rest, parts.uri.query(), &parts.headers)
            .await;
    };

    if *method != Method::GET {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return build_405_response(ALLOWED);
    }

    match route {
        Route::Content => content::handle_content(state).await,
        Route::Test => diagnostic::handle_test(state).await,
        Route::Liveness => health::liveness(),
        Route::Readiness => health::readiness(state),
    }
}
