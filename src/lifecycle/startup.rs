//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every subsystem from a validated configuration
//! - Start background tasks (metrics exporter, admission reaper)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::{ConfigError, GatewayConfig};
use crate::http::GatewayServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Fatal errors before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid address {0:?}")]
    Address(String),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Build, bind and serve until `shutdown` fires.
pub async fn run(config: GatewayConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    // Subscribe first so a signal arriving during startup is not lost.
    let signal = shutdown.subscribe();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        admission = config.admission.enabled,
        sustained_rate = config.admission.sustained_rate,
        burst = config.admission.burst,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    let server = GatewayServer::new(config)?;
    let config = server.config();

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested during startup, not binding");
        return Ok(());
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, signal).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config
    }

    #[tokio::test]
    async fn test_shutdown_before_startup_returns() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let result = tokio::time::timeout(Duration::from_secs(5), run(local_config(), shutdown)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_shutdown_during_startup_stops_server() {
        let shutdown = Shutdown::new();
        let trigger = async {
            tokio::task::yield_now().await;
            shutdown.trigger();
        };

        let (result, ()) = tokio::join!(
            tokio::time::timeout(Duration::from_secs(5), run(local_config(), shutdown.clone())),
            trigger
        );
        assert!(matches!(result, Ok(Ok(()))));
    }
}
