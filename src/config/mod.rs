// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{BackendConfig, Config, CorsConfig, HealthConfig, HttpConfig};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment prefix, e.g. `LANDING__BACKEND__SERVICE_KEY`
const ENV_PREFIX: &str = "LANDING";

impl Config {
    /// Load configuration from specified file path (without extension).
    /// The file is optional; environment variables override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );

        Self::with_defaults(settings)?.build()?.try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "landing-content/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("backend.table", "landing_page_content")?
            .set_default("backend.timeout_secs", 10)?
            .set_default("backend.client_info", "crescents-landing-server/1.0")?
            .set_default("backend.anon_client_info", "crescents-landing/1.0")?
            .set_default("backend.probe_on_start", false)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
