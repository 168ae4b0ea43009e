//! API Gateway
//!
//! Reverse proxy that admits, routes and forwards HTTP requests.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────────────┐
//!     ────────────────────┼─▶ request id ─▶ admission ─▶ route table ─▶ forward ─┼──▶ Upstream
//!                         │   (uuid)        (token       (longest     (hyper    │
//!                         │                  bucket)      prefix)      client)  │
//!     Client Response     │                                                      │
//!     ◀───────────────────┼── hardening headers ◀──── relayed response ◀─────────┼─── Upstream
//!                         │                                                      │
//!                         │   reaper (evicts idle buckets)   observer (logs, metrics)
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api_gateway::config::load_config;
use api_gateway::lifecycle::{startup, Shutdown};
use api_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "HTTP reverse-proxy gateway with per-client rate limiting", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    match startup::run(config, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
