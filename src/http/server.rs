//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway pipeline and `/health`
//! - Wire up middleware (tracing, request ID, hardening headers)
//! - Answer `GET /health` locally; every other method on that path is proxied
//! - Run admission control, then routing and forwarding, per request
//! - Own the admission registry and its reaper
//! - Bind server to listener with graceful shutdown

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig};
use crate::error::GatewayError;
use crate::http::context::{client_identity, RequestContext};
use crate::http::forward::ForwardingEngine;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::{metrics, GatewayObserver, TracingObserver};
use crate::routing::RouteTable;
use crate::security::headers::SECURE_RESPONSE_HEADERS;
use crate::security::AdmissionController;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ForwardingEngine>,
    pub admission: Option<Arc<AdmissionController>>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    admission: Option<Arc<AdmissionController>>,
}

impl GatewayServer {
    /// Create a server reporting through [`TracingObserver`].
    ///
    /// Fails if the configuration is invalid; nothing is served in that case.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a server reporting request outcomes to `observer`.
    pub fn with_observer(
        config: GatewayConfig,
        observer: Arc<dyn GatewayObserver>,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Invalid)?;

        let routes = Arc::new(RouteTable::from_config(&config.routes)?);
        let engine = Arc::new(ForwardingEngine::new(routes, &config.timeouts, observer));
        let admission = config
            .admission
            .enabled
            .then(|| Arc::new(AdmissionController::from_config(&config.admission)));

        let state = AppState {
            engine,
            admission: admission.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            admission,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The inbound deadline is enforced by the forwarding engine rather than
    /// a tower timeout, so an expired request still ends in a gateway 502
    /// and is still reported.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler).fallback(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state);

        if config.security.secure_headers {
            for (name, value) in SECURE_RESPONSE_HEADERS {
                router = router.layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                ));
            }
        }

        router
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn admission(&self) -> Option<&Arc<AdmissionController>> {
        self.admission.as_ref()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, draining in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reaper = self
            .admission
            .clone()
            .map(|admission| admission.spawn_reaper(shutdown.resubscribe()));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if let Some(reaper) = reaper {
            let _ = reaper.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway pipeline: admission, then routing and forwarding.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();

    if let Some(admission) = &state.admission {
        let client = client_identity(request.extensions());
        if !admission.allow(&client) {
            let request_id = RequestContext::from_extensions(request.extensions())
                .request_id_str()
                .map(str::to_string);
            tracing::warn!(request_id = ?request_id, client = %client, "Rate limit exceeded");
            metrics::record_rate_limited();

            let response = GatewayError::RateLimited { client }.into_response();
            state.engine.report(request_id, None, &response, started, None);
            return response;
        }
    }

    state.engine.dispatch(request, started).await
}

async fn health_handler() -> &'static str {
    "OK"
}
