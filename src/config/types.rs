// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    pub backend: BackendConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Edge/CDN revalidation window in seconds. Emitted as `CDN-Cache-Control`
    /// on the content endpoint when set; browsers keep obeying `no-store`.
    #[serde(default)]
    pub edge_revalidate_secs: Option<u64>,
}

/// Cross-origin policy applied to every response
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_origin() -> String {
    "*".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_methods() -> String {
    "GET, OPTIONS, POST, PUT, DELETE".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_headers() -> String {
    "Content-Type, Authorization, apikey".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_credentials() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RoutesConfig {
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Hosted backend connection settings
///
/// Keys are optional here: a missing key is reported as a configuration
/// error by the client factory the first time a client is needed.
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// Unprivileged key, subject to the backend's access policy
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Privileged key, bypasses the access policy. Server-side only.
    #[serde(default)]
    pub service_key: Option<String>,
    pub table: String,
    pub timeout_secs: u64,
    /// `X-Client-Info` sent by the privileged tier
    pub client_info: String,
    /// `X-Client-Info` sent by the unprivileged tier
    pub anon_client_info: String,
    #[serde(default)]
    pub probe_on_start: bool,
}
