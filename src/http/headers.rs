//! Response header composition
//!
//! Single place where CORS and cache directives are decided. The request
//! middleware calls [`HeaderComposer::finish`] once on every response;
//! the content route additionally asks for [`HeaderComposer::apply_no_store`].

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS,
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CACHE_CONTROL, EXPIRES, PRAGMA, SERVER,
};
use hyper::Response;

use crate::config::HttpConfig;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// Edge-only cache directive; browsers ignore it
static CDN_CACHE_CONTROL: HeaderName = HeaderName::from_static("cdn-cache-control");

#[derive(Debug, Clone)]
pub struct HeaderComposer {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
    edge_revalidate: Option<HeaderValue>,
    server_name: HeaderValue,
}

impl HeaderComposer {
    /// Validate configured header values once at startup
    pub fn new(http: &HttpConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&http.cors.allow_origin)?,
            allow_methods: HeaderValue::from_str(&http.cors.allow_methods)?,
            allow_headers: HeaderValue::from_str(&http.cors.allow_headers)?,
            allow_credentials: http.cors.allow_credentials,
            edge_revalidate: http
                .edge_revalidate_secs
                .map(|secs| HeaderValue::from_str(&format!("max-age={secs}")))
                .transpose()?,
            server_name: HeaderValue::from_str(&http.server_name)?,
        })
    }

    /// Cross-origin permissions
    pub fn apply_cors(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }

    /// Forbid browser and intermediary caching so edits show up immediately
    pub fn apply_no_store(&self, headers: &mut HeaderMap) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(EXPIRES, HeaderValue::from_static("0"));
        if let Some(hint) = &self.edge_revalidate {
            headers.insert(CDN_CACHE_CONTROL.clone(), hint.clone());
        }
    }

    /// Final pass applied to every outgoing response
    pub fn finish<B>(&self, response: &mut Response<B>) {
        let headers = response.headers_mut();
        self.apply_cors(headers);
        headers.insert(SERVER, self.server_name.clone());
    }
}
