// Startup error type

use thiserror::Error;

/// Fatal errors while bringing the process up
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid header value in http configuration: {0}")]
    Header(#[from] hyper::header::InvalidHeaderValue),
    #[error("{0}")]
    Address(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
