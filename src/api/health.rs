// Liveness and readiness probes

use hyper::StatusCode;

use crate::config::AppState;
use crate::http::{build_health_response, HttpResponse};

pub fn liveness() -> HttpResponse {
    build_health_response(StatusCode::OK, "ok", None)
}

/// Ready once the privileged backend client exists. Reachability is not
/// probed here; content requests degrade to defaults anyway.
pub fn readiness(state: &AppState) -> HttpResponse {
    match &state.privileged {
        Ok(_) => build_health_response(StatusCode::OK, "ok", None),
        Err(e) => build_health_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "unconfigured",
            Some(e.to_string()),
        ),
    }
}
