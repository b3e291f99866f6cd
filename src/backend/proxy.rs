// REST passthrough
// Relays `/api/<path>` reads to `<base>/rest/v1/<path>` under the caller's credentials

use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_RANGE, CONTENT_TYPE};
use hyper::StatusCode;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::error::{BackendError, ConfigurationError};
use super::factory::parse_base_url;
use super::rest::REST_PREFIX;
use crate::config::BackendConfig;

/// Caller headers carried upstream
const FORWARDED: [&str; 6] = [
    "apikey",
    "authorization",
    "accept",
    "prefer",
    "range",
    "x-client-info",
];

/// Upstream answer, relayed as is
#[derive(Debug)]
pub struct Relayed {
    pub status: StatusCode,
    /// `Content-Type` and `Content-Range`, when the backend sent them
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub struct RestProxy {
    http: reqwest::Client,
    base_url: reqwest::Url,
    client_info: String,
}

impl RestProxy {
    /// Needs only the base URL; credentials come from each caller
    pub fn from_config(cfg: &BackendConfig) -> Result<Self, ConfigurationError> {
        let Some(raw_url) = cfg.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Err(ConfigurationError::Missing(vec!["backend.url"]));
        };
        let base_url = parse_base_url(raw_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            client_info: cfg.anon_client_info.clone(),
        })
    }

    fn target(&self, rest: &str, query: Option<&str>) -> String {
        let mut url = format!(
            "{}/{REST_PREFIX}/{rest}",
            self.base_url.as_str().trim_end_matches('/')
        );
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// GET `<base>/rest/v1/<rest>?<query>` and hand back whatever came back.
    /// Error statuses are relayed, not mapped; only transport failures err.
    pub async fn forward(
        &self,
        rest: &str,
        query: Option<&str>,
        caller: &HeaderMap,
    ) -> Result<Relayed, BackendError> {
        let mut headers = HeaderMap::new();
        for name in FORWARDED {
            if let Some(value) = caller.get(name) {
                headers.insert(name, value.clone());
            }
        }
        if !headers.contains_key("x-client-info") {
            if let Ok(value) = HeaderValue::from_str(&self.client_info) {
                headers.insert("x-client-info", value);
            }
        }

        debug!(path = rest, "relaying backend read");
        let response = self
            .http
            .get(self.target(rest, query))
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        let mut relayed = HeaderMap::new();
        for name in [CONTENT_TYPE, CONTENT_RANGE] {
            if let Some(value) = response.headers().get(&name) {
                relayed.insert(name, value.clone());
            }
        }
        let body = response.bytes().await?;

        Ok(Relayed {
            status,
            headers: relayed,
            body,
        })
    }
}

impl fmt::Debug for RestProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestProxy")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
