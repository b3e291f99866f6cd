use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod backend;
mod config;
mod content;
mod diagnostics;
mod error;
mod http;
mod logger;
mod server;

use backend::{BackendClient, ClientTier};
use error::StartupError;

#[derive(Parser, Debug)]
#[clap(
    name = "landing-content",
    version,
    about = "Landing page content API backed by a hosted PostgREST table"
)]
struct Cli {
    /// Config file path, without extension
    #[clap(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the content API (default)
    Serve,
    /// Check backend reachability and both API endpoints of a running instance
    Diagnose {
        /// Base URL of the running instance
        #[clap(long, default_value = "http://127.0.0.1:3000")]
        base_url: String,
        /// Run the direct backend check with a user's access token
        #[clap(long)]
        access_token: Option<String>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = config::Config::load_from(&cli.config).map_err(StartupError::from)?;
    let _log_guards = logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!(workers, "using configured worker threads");
    }
    let runtime = runtime_builder.build()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            runtime.block_on(serve(cfg))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Diagnose {
            base_url,
            access_token,
        } => runtime.block_on(diagnose(&cfg, &base_url, access_token.as_deref())),
    }
}

async fn serve(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr().map_err(StartupError::Address)?;
    let listener = server::create_reusable_listener(addr).map_err(StartupError::from)?;
    let state = Arc::new(config::AppState::new(&cfg)?);

    if cfg.backend.probe_on_start {
        probe_backend(&state).await;
    }

    logger::log_server_start(&addr, &cfg);

    // spawn_local needs a LocalSet
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            server::shutdown_signal(),
        ))
        .await?;
    Ok(())
}

/// One-off reachability probe; the outcome is only logged
async fn probe_backend(state: &config::AppState) {
    let table = &state.config.backend.table;
    match &state.privileged {
        Ok(client) => match client.health_check(table).await {
            Ok(()) => tracing::info!(%table, tier = %client.tier(), "backend probe succeeded"),
            Err(e) => tracing::warn!(
                %table,
                tier = %client.tier(),
                error = %e,
                code = ?e.code(),
                "backend probe failed"
            ),
        },
        Err(e) => tracing::warn!(error = %e, "backend probe skipped"),
    }
}

async fn diagnose(
    cfg: &config::Config,
    base_url: &str,
    access_token: Option<&str>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let direct = match access_token {
        Some(token) => backend::connect_with_token(&cfg.backend, token),
        None => backend::connect(&cfg.backend, ClientTier::Unprivileged),
    }
    .map(|client| Arc::new(client) as Arc<dyn BackendClient>);

    let harness = diagnostics::Harness::new(
        base_url,
        direct,
        cfg.backend.table.as_str(),
        Duration::from_secs(cfg.backend.timeout_secs),
    )?;
    let report = harness.run().await;
    println!("{report}");

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
