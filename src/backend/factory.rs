// Backend client factory
// Validates connection settings and binds a REST client to a credential tier

use std::fmt;
use std::time::Duration;

use super::error::ConfigurationError;
use super::rest::RestClient;
use crate::config::BackendConfig;

/// Credential tier of a backend client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientTier {
    /// Anon key; subject to the backend's row-level access policy
    Unprivileged,
    /// Service key; bypasses the access policy. Never hand to a browser.
    Privileged,
}

impl ClientTier {
    const fn key_setting(self) -> &'static str {
        match self {
            Self::Unprivileged => "backend.anon_key",
            Self::Privileged => "backend.service_key",
        }
    }

    fn client_info(self, cfg: &BackendConfig) -> &str {
        match self {
            Self::Unprivileged => &cfg.anon_client_info,
            Self::Privileged => &cfg.client_info,
        }
    }

    fn key(self, cfg: &BackendConfig) -> Option<&str> {
        let key = match self {
            Self::Unprivileged => cfg.anon_key.as_deref(),
            Self::Privileged => cfg.service_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Display for ClientTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unprivileged => write!(f, "unprivileged"),
            Self::Privileged => write!(f, "privileged"),
        }
    }
}

/// Build a client for `tier`, or report why it cannot exist
pub fn connect(cfg: &BackendConfig, tier: ClientTier) -> Result<RestClient, ConfigurationError> {
    let (url, key) = validate(cfg, tier)?;
    let bearer = key.to_string();
    build(cfg, tier, url, key, bearer)
}

/// Privileged client that forwards a caller's access token as the bearer.
/// The `apikey` header still carries the service key.
pub fn connect_with_token(
    cfg: &BackendConfig,
    access_token: &str,
) -> Result<RestClient, ConfigurationError> {
    let (url, key) = validate(cfg, ClientTier::Privileged)?;
    build(cfg, ClientTier::Privileged, url, key, access_token.to_string())
}

fn validate(
    cfg: &BackendConfig,
    tier: ClientTier,
) -> Result<(reqwest::Url, &str), ConfigurationError> {
    let raw_url = cfg.url.as_deref().filter(|u| !u.trim().is_empty());
    let key = tier.key(cfg);

    let mut missing = Vec::new();
    if raw_url.is_none() {
        missing.push("backend.url");
    }
    if key.is_none() {
        missing.push(tier.key_setting());
    }

    let (Some(raw_url), Some(key)) = (raw_url, key) else {
        tracing::error!(%tier, ?missing, "backend configuration error");
        return Err(ConfigurationError::Missing(missing));
    };

    Ok((parse_base_url(raw_url)?, key))
}

/// Parse the backend base URL; only http and https are accepted
pub(super) fn parse_base_url(raw_url: &str) -> Result<reqwest::Url, ConfigurationError> {
    let url = reqwest::Url::parse(raw_url).map_err(|e| ConfigurationError::InvalidUrl {
        url: raw_url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidUrl {
            url: raw_url.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}

fn build(
    cfg: &BackendConfig,
    tier: ClientTier,
    url: reqwest::Url,
    key: &str,
    bearer: String,
) -> Result<RestClient, ConfigurationError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|e| ConfigurationError::Client(e.to_string()))?;

    tracing::debug!(%tier, host = url.host_str().unwrap_or("-"), "backend client constructed");

    Ok(RestClient::new(
        http,
        url,
        tier,
        key.to_string(),
        bearer,
        tier.client_info(cfg).to_string(),
    ))
}
