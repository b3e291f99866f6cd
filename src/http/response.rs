//! HTTP response building module
//!
//! Builders for the response shapes the service emits. Headers shared by
//! every response (CORS, `Server`) are added later by the composer.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::logger;

pub type HttpResponse = Response<Full<Bytes>>;

const JSON: &str = "application/json";

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(CONTENT_TYPE, JSON)
                .body(Full::new(Bytes::from_static(
                    br#"{"success":false,"error":"Internal server error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Empty body response (preflight)
pub fn build_empty_response(status: StatusCode) -> HttpResponse {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 404 Not Found response
pub fn build_404_response(path: &str) -> HttpResponse {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
            "available_endpoints": ["/api/content", "/api/test"]
        }),
    )
}

/// 405 Method Not Allowed response
pub fn build_405_response(allow: &'static str) -> HttpResponse {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({ "error": "Method Not Allowed" }),
    );
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(allow));
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &serde_json::json!({ "error": "Payload Too Large" }),
    )
}

/// Health probe response
pub fn build_health_response(status: StatusCode, state: &str, detail: Option<String>) -> HttpResponse {
    json_response(
        status,
        &serde_json::json!({ "status": state, "detail": detail }),
    )
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response() {
        let response = json_response(StatusCode::CREATED, &serde_json::json!({"ok": true}));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON);
        assert_eq!(body_json(response).await["ok"], true);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let response = build_empty_response(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_405_has_allow() {
        let response = build_405_response("GET, OPTIONS");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, OPTIONS");
    }

    #[tokio::test]
    async fn test_404_lists_endpoints() {
        let body = body_json(build_404_response("/nope")).await;
        assert_eq!(body["path"], "/nope");
        assert_eq!(body["available_endpoints"][0], "/api/content");
    }
}
