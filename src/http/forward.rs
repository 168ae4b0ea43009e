//! Request forwarding.
//!
//! # Responsibilities
//! - Resolve the route for a request
//! - Build the outbound request (same method, path, query, body and
//!   end-to-end headers; upstream `Host`; trust context headers)
//! - Execute the upstream call under a bounded timeout
//! - Relay the upstream response, or answer 502 on transport failure
//! - Report one outcome event per request to the observer
//!
//! # Design Decisions
//! - The original path is forwarded unchanged; no prefix stripping
//! - Bodies stream through in both directions, nothing is buffered
//! - A relayed body that produces no frame within the upstream timeout is
//!   aborted
//! - Upstream 4xx/5xx are relayed verbatim; they are not gateway errors
//! - No retries: every failure is terminal for its request
//! - Dropping the handler future (client gone, deadline hit) cancels the
//!   upstream call and releases its connection

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header::HOST, uri::PathAndQuery, HeaderValue, Request, Uri},
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use tower_http::timeout::TimeoutBody;

use crate::config::TimeoutConfig;
use crate::error::{GatewayError, UpstreamError};
use crate::http::context::{client_addr, RequestContext, TrustContextPropagator};
use crate::observability::{ForwardEvent, GatewayObserver};
use crate::routing::{Route, RouteTable};
use crate::security::headers::{append_forwarded_for, strip_hop_by_hop};

/// Result of one upstream exchange.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// The upstream answered; its response is relayed as-is.
    Relayed {
        response: Response,
        upstream_elapsed: Duration,
    },
    /// No usable upstream response.
    Failed {
        error: GatewayError,
        upstream_elapsed: Option<Duration>,
    },
}

impl ForwardOutcome {
    pub fn upstream_elapsed(&self) -> Option<Duration> {
        match self {
            ForwardOutcome::Relayed { upstream_elapsed, .. } => Some(*upstream_elapsed),
            ForwardOutcome::Failed { upstream_elapsed, .. } => *upstream_elapsed,
        }
    }

    pub fn into_response(self) -> Response {
        match self {
            ForwardOutcome::Relayed { response, .. } => response,
            ForwardOutcome::Failed { error, .. } => error.into_response(),
        }
    }
}

/// Routes and forwards requests to upstream services.
pub struct ForwardingEngine {
    routes: Arc<RouteTable>,
    client: Client<HttpConnector, Body>,
    upstream_timeout: Duration,
    request_timeout: Duration,
    propagator: TrustContextPropagator,
    observer: Arc<dyn GatewayObserver>,
}

impl ForwardingEngine {
    pub fn new(
        routes: Arc<RouteTable>,
        timeouts: &TimeoutConfig,
        observer: Arc<dyn GatewayObserver>,
    ) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            routes,
            client,
            upstream_timeout: Duration::from_secs(timeouts.upstream_secs),
            request_timeout: Duration::from_secs(timeouts.request_secs),
            propagator: TrustContextPropagator,
            observer,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Resolve, forward and report. `started` marks when the gateway
    /// began handling the request, so admission time is included.
    pub async fn dispatch(&self, request: Request<Body>, started: Instant) -> Response {
        let path = request.uri().path().to_string();
        let request_id = RequestContext::from_extensions(request.extensions())
            .request_id_str()
            .map(str::to_string);

        let Some(route) = self.routes.resolve(&path) else {
            tracing::warn!(request_id = ?request_id, path = %path, "No route matched");
            let response = GatewayError::RouteNotFound { path }.into_response();
            self.report(request_id, None, &response, started, None);
            return response;
        };

        tracing::debug!(
            request_id = ?request_id,
            path = %path,
            route = %route.prefix(),
            upstream = %route.authority(),
            "Proxying request"
        );

        // The upstream call never outlives the inbound request deadline.
        let budget = self
            .request_timeout
            .saturating_sub(started.elapsed())
            .min(self.upstream_timeout);
        let outcome = self.forward(route, request, budget).await;
        let upstream_elapsed = outcome.upstream_elapsed();
        let response = outcome.into_response();
        self.report(request_id, Some(route.prefix()), &response, started, upstream_elapsed);
        response
    }

    /// Forward `request` to `route`'s upstream, waiting at most `timeout`
    /// for the response head.
    pub async fn forward(&self, route: &Route, request: Request<Body>, timeout: Duration) -> ForwardOutcome {
        let outbound = match self.prepare(route, request) {
            Ok(outbound) => outbound,
            Err(error) => return self.on_error(route, error, None),
        };

        let upstream_start = Instant::now();
        let result = time::timeout(timeout, self.client.request(outbound)).await;
        let elapsed = upstream_start.elapsed();

        match result {
            Ok(Ok(response)) => self.on_response(route, response, elapsed),
            Ok(Err(e)) => self.on_error(route, UpstreamError::Transport(e), Some(elapsed)),
            Err(_) => self.on_error(route, UpstreamError::Timeout(timeout), Some(elapsed)),
        }
    }

    /// Build the outbound request for `route`.
    pub fn prepare(&self, route: &Route, request: Request<Body>) -> Result<Request<Body>, UpstreamError> {
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        let uri = Uri::builder()
            .scheme(route.scheme().clone())
            .authority(route.authority().clone())
            .path_and_query(path_and_query)
            .build()?;

        let mut headers = std::mem::take(&mut parts.headers);
        strip_hop_by_hop(&mut headers);
        let host = HeaderValue::from_str(route.authority().as_str()).map_err(axum::http::Error::from)?;
        headers.insert(HOST, host);
        if let Some(client) = client_addr(&parts.extensions) {
            append_forwarded_for(&mut headers, client.ip());
        }
        self.propagator
            .propagate(&RequestContext::from_extensions(&parts.extensions), &mut headers);

        let mut outbound = Request::builder().method(parts.method).uri(uri).body(body)?;
        *outbound.headers_mut() = headers;
        Ok(outbound)
    }

    /// Relay an upstream response: status, headers and body stay as sent,
    /// minus hop-by-hop headers. The body stream is cut off if the upstream
    /// stalls between frames for longer than the upstream timeout.
    pub fn on_response(&self, route: &Route, response: Response<Incoming>, elapsed: Duration) -> ForwardOutcome {
        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);

        tracing::debug!(
            route = %route.prefix(),
            status = %parts.status,
            upstream_ms = elapsed.as_millis() as u64,
            "Upstream responded"
        );

        ForwardOutcome::Relayed {
            response: Response::from_parts(parts, Body::new(TimeoutBody::new(self.upstream_timeout, body))),
            upstream_elapsed: elapsed,
        }
    }

    /// Turn a transport failure into a gateway failure. The cause is
    /// logged here and nowhere else.
    pub fn on_error(&self, route: &Route, error: UpstreamError, elapsed: Option<Duration>) -> ForwardOutcome {
        tracing::warn!(
            route = %route.prefix(),
            upstream = %route.authority(),
            error = %error,
            "Upstream request failed"
        );

        ForwardOutcome::Failed {
            error: GatewayError::UpstreamUnreachable {
                upstream: route.authority().to_string(),
                source: error,
            },
            upstream_elapsed: elapsed,
        }
    }

    /// Hand the request outcome to the observer.
    pub fn report(
        &self,
        request_id: Option<String>,
        route: Option<&str>,
        response: &Response,
        started: Instant,
        upstream: Option<Duration>,
    ) {
        self.observer.record(&ForwardEvent {
            request_id,
            route: route.map(str::to_string),
            status: response.status().as_u16(),
            total: started.elapsed(),
            upstream,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::{Identity, X_REQUEST_ID, X_USER_ID};
    use crate::observability::TracingObserver;
    use axum::extract::ConnectInfo;
    use axum::http::Method;
    use std::net::SocketAddr;
    use tower_http::request_id::RequestId;

    fn engine() -> ForwardingEngine {
        let routes = RouteTable::from_config(&[crate::config::RouteConfig::new(
            "/users",
            "http://users.internal:9001",
        )])
        .unwrap();
        ForwardingEngine::new(Arc::new(routes), &TimeoutConfig::default(), Arc::new(TracingObserver))
    }

    #[test]
    fn test_prepare_rewrites_target_only() {
        let engine = engine();
        let route = engine.routes().resolve("/users/1").unwrap().clone();

        let mut request = Request::builder()
            .method(Method::PATCH)
            .uri("/users/1?q=golang&limit=10")
            .header("host", "gateway.example.com")
            .header("connection", "close")
            .header("content-type", "application/json")
            .header("x-user-id", "spoofed")
            .body(Body::from(r#"{"name":"test"}"#))
            .unwrap();
        request.extensions_mut().insert(Identity::new("user-1"));
        request
            .extensions_mut()
            .insert(RequestId::new(HeaderValue::from_static("req-9")));
        request
            .extensions_mut()
            .insert(ConnectInfo("10.0.0.5:4000".parse::<SocketAddr>().unwrap()));

        let outbound = engine.prepare(&route, request).unwrap();

        assert_eq!(outbound.method(), Method::PATCH);
        assert_eq!(outbound.uri(), "http://users.internal:9001/users/1?q=golang&limit=10");
        let headers = outbound.headers();
        assert_eq!(headers["host"], "users.internal:9001");
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["x-forwarded-for"], "10.0.0.5");
        assert_eq!(headers[&X_USER_ID], "user-1");
        assert_eq!(headers[&X_REQUEST_ID], "req-9");
        assert!(!headers.contains_key("connection"));
    }

    #[test]
    fn test_prepare_without_query_or_identity() {
        let engine = engine();
        let route = engine.routes().resolve("/users").unwrap().clone();
        let request = Request::builder().uri("/users").body(Body::empty()).unwrap();

        let outbound = engine.prepare(&route, request).unwrap();
        assert_eq!(outbound.uri(), "http://users.internal:9001/users");
        assert!(!outbound.headers().contains_key(&X_USER_ID));
    }

    #[tokio::test]
    async fn test_unroutable_request_is_404() {
        let engine = engine();
        let request = Request::builder().uri("/orders/1").body(Body::empty()).unwrap();

        let response = engine.dispatch(request, Instant::now()).await;
        assert_eq!(response.status(), 404);
    }
}
