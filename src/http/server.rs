//! HTTP server setup and the proxy request handler.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener with graceful shutdown
//! - Authenticate callers and validate the path shape
//! - Forward requests upstream with retries
//! - Normalize and return the upstream response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::client::{HttpTransport, Transport};
use crate::http::request::{buffer_body, request_id, ForwardContext, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::{into_client_response, normalize};
use crate::observability::metrics;
use crate::resilience::{send_with_retries, RetryPolicy};
use crate::routing::resolve;
use crate::security::check_proxy_key;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub transport: Arc<dyn Transport>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a server that talks to upstreams over HTTPS.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(&config.upstream)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a server with a caller-supplied transport.
    pub fn with_transport(config: ProxyConfig, transport: Arc<dyn Transport>) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            transport,
        };

        Self {
            router: Self::build_router(state),
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(req.headers()),
                    method = %req.method(),
                    path = %req.uri().path(),
                )
            }))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_domain = %self.config.upstream.domain,
            max_attempts = self.config.upstream.max_attempts,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ProxyError::AuthRejected
                | ProxyError::MalformedPath
                | ProxyError::BodyTooLarge { .. }
                | ProxyError::BodyUnreadable { .. } => {
                    tracing::warn!(error = %e, "Request rejected");
                }
                ProxyError::RetryExhausted { .. } | ProxyError::DecodeFailure { .. } => {
                    tracing::error!(error = %e, "Proxying failed");
                }
            }
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

/// Run one request through auth, resolution, retries and normalization.
async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, ProxyError> {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();
    let config = &state.config;

    // 1. Caller key
    check_proxy_key(&parts.headers, config.security.required_key())?;

    // 2. Path shape
    let target = resolve(parts.uri.path())?;

    // 3. Upstream exchange
    let body = buffer_body(body, config.listener.max_body_bytes).await?;
    let upstream = &config.upstream;
    let ctx = ForwardContext::new(&parts, &body, &target, upstream)?;

    tracing::debug!(
        client = ?client_addr,
        upstream = %ctx.uri,
        body_bytes = body.len(),
        "Proxying request"
    );

    let policy = RetryPolicy {
        max_attempts: upstream.max_attempts,
        attempt_timeout: Duration::from_secs(upstream.timeout_secs),
    };
    let response = send_with_retries(state.transport.as_ref(), policy, |_| ctx.build(upstream)).await?;

    // 4. Body decoding
    let normalized = normalize(&response.headers, response.body, upstream.max_decoded_bytes)?;

    tracing::debug!(
        status = %response.status,
        body_bytes = normalized.body.len(),
        encoding_retained = normalized.encoding_retained,
        "Upstream responded"
    );

    // 5. Client response
    Ok(into_client_response(response.status, &response.headers, normalized))
}
