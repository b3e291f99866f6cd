//! Logger module
//!
//! Thin helpers over `tracing`:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogGuards;

use crate::config::Config;
use crate::error::StartupError;
use std::net::SocketAddr;
use writer::ACCESS_TARGET;

/// Initialize logging from configuration
///
/// Should be called once at application startup; keep the guards alive.
pub fn init(config: &Config) -> Result<LogGuards, StartupError> {
    writer::init(
        &config.logging.level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        listen = %format!("http://{addr}"),
        level = %config.logging.level,
        workers = ?config.server.workers,
        access_log = ?config.logging.access_log_file,
        error_log = ?config.logging.error_log_file,
        "landing content server started"
    );
    log_backend_settings(config);
}

/// Report which backend settings are present without printing them
fn log_backend_settings(config: &Config) {
    let presence = |v: &Option<String>| if v.is_some() { "set" } else { "missing" };
    tracing::info!(
        url = presence(&config.backend.url),
        anon_key = presence(&config.backend.anon_key),
        service_key = presence(&config.backend.service_key),
        table = %config.backend.table,
        timeout_secs = config.backend.timeout_secs,
        "backend settings"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    tracing::info!(reason, "shutting down");
}
