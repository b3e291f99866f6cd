// Server loop
// Accepts connections until shutdown, then drains in-flight connections

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed and active connections get up to
/// the configured connection timeout to finish.
pub async fn start_server_loop<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> io::Result<()>
where
    S: Future<Output = io::Result<&'static str>>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    let reason = loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            signal = &mut shutdown => break signal?,
        }
    };

    logger::log_shutdown(reason);
    drop(listener);

    let performance = &state.config.performance;
    let grace = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));
    drain(&active_connections, grace).await;
    Ok(())
}

/// Wait for the connection counter to reach zero, giving up after `grace`.
async fn drain(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            tracing::info!("all connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {remaining} connections still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
