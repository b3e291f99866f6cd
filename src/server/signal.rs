// Shutdown signals
//
// SIGTERM and SIGINT both request a graceful shutdown. Other platforms
// only get Ctrl+C.

use std::io;

/// Resolve once a shutdown signal arrives, returning its name.
#[cfg(unix)]
pub async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tracing::debug!(pid = std::process::id(), "signal handlers registered");

    let reason = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(reason)
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
