// Application state module
// Long-lived clients and per-process caches shared by every request

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::backend::{self, BackendClient, BackendHandle, ClientTier, ConfigurationError, RestProxy};
use crate::content::ContentResolver;
use crate::error::StartupError;
use crate::http::HeaderComposer;

/// Application state
///
/// Built once at startup and shared read-only across connections.
pub struct AppState {
    pub config: Config,
    pub composer: HeaderComposer,
    /// Privileged backend client, or the reason it could not be built
    pub privileged: BackendHandle,
    pub resolver: ContentResolver,
    /// Relay for `/api/<path>` reads, or the reason it is unavailable
    pub proxy: Result<RestProxy, ConfigurationError>,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Create `AppState` with a privileged client built from the config.
    /// Missing backend settings are kept as an error, not a startup failure.
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let privileged = backend::connect(&config.backend, ClientTier::Privileged)
            .map(|client| Arc::new(client) as Arc<dyn BackendClient>);
        Self::with_backend(config, privileged)
    }

    /// Create `AppState` around an already constructed backend handle
    pub fn with_backend(config: &Config, privileged: BackendHandle) -> Result<Self, StartupError> {
        let composer = HeaderComposer::new(&config.http)?;
        let resolver = ContentResolver::new(privileged.clone(), config.backend.table.as_str());

        Ok(Self {
            config: config.clone(),
            composer,
            privileged,
            resolver,
            proxy: RestProxy::from_config(&config.backend),
            cached_access_log: AtomicBool::new(config.logging.access_log),
        })
    }
}
