//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Serve a listener until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id, set_request_id, X_REQUEST_ID};
use crate::pipeline::Pipeline;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub max_body_bytes: usize,
    /// Parent of every request token; cancelled on forced shutdown.
    pub cancel: CancellationToken,
}

/// HTTP front end of the rendering service.
pub struct HttpServer {
    router: Router,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server around a ready pipeline.
    pub fn new(config: &ServiceConfig, pipeline: Arc<Pipeline>) -> Self {
        let cancel = CancellationToken::new();
        let state = AppState {
            pipeline,
            max_body_bytes: config.limits.max_body_bytes,
            cancel: cancel.clone(),
        };
        Self {
            router: Self::build_router(config, state),
            cancel,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/", post(handlers::generate_pdf))
            .route("/styles/{file}", get(handlers::stylesheet))
            .with_state(state);

        let router = if config.timeouts.request_secs > 0 {
            router.layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
        } else {
            router
        };

        router
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(propagate_request_id())
            .layer(set_request_id())
    }

    /// Token that cancels the work of every in-flight request.
    ///
    /// Connections are served on their own tasks, so aborting the server
    /// task alone does not stop them.
    pub fn abort_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` resolves and every open connection has finished.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
