// Content endpoint handler

use crate::config::AppState;
use crate::http::{json_response, HttpResponse};

/// `GET /api/content`: resolved document, never cached by intermediaries
pub async fn handle_content(state: &AppState) -> HttpResponse {
    let resolved = state.resolver.resolve().await;
    let status = resolved.status;

    let mut response = json_response(status, &resolved.into_body());
    state.composer.apply_no_store(response.headers_mut());
    response
}
