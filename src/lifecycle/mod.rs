//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Resolve PDF backend → Build pipeline → Bind listener
//!
//! Serving (this module):
//!     Starting → Running → ShuttingDown → Stopped
//!
//! Shutdown (shutdown.rs):
//!     Token cancelled → Stop accepting → Drain in-flight requests
//!     → Abort after the grace period
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: pipeline first, then listener
//! - Shutdown has a deadline: forced stop after the grace period
//! - A listener failure outranks a shutdown timeout when reporting

pub mod shutdown;
pub mod signals;
pub mod startup;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::pipeline::Pipeline;

pub use shutdown::{drain, Drain, Shutdown};
pub use signals::spawn_signal_handler;
pub use startup::{build_pipeline, StartupError};

/// Where the service is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

/// Terminal errors of a service run.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("listener failed: {0}")]
    Listener(#[source] io::Error),

    #[error("graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

/// A bound, ready-to-run service.
pub struct Service {
    config: ServiceConfig,
    pipeline: Arc<Pipeline>,
    listener: TcpListener,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
}

impl Service {
    /// Build the pipeline from `config` and bind the listener.
    pub async fn start(config: ServiceConfig) -> Result<Self, StartupError> {
        Self::prepare(config, None).await
    }

    /// Bind the listener around an already built pipeline.
    pub async fn bind(config: ServiceConfig, pipeline: Arc<Pipeline>) -> Result<Self, StartupError> {
        Self::prepare(config, Some(pipeline)).await
    }

    async fn prepare(
        config: ServiceConfig,
        pipeline: Option<Arc<Pipeline>>,
    ) -> Result<Self, StartupError> {
        let (state, _) = watch::channel(LifecycleState::Starting);
        let (pipeline, listener) = startup::prepare(&config, pipeline).await?;
        let grace = Duration::from_secs(config.timeouts.shutdown_grace_secs);
        Ok(Self {
            config,
            pipeline,
            listener,
            grace,
            state,
        })
    }

    /// Override the shutdown grace period.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve until `shutdown` is cancelled, then drain within the grace period.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServeError> {
        let Service {
            config,
            pipeline,
            listener,
            grace,
            state,
        } = self;

        let server = HttpServer::new(&config, pipeline);
        let abort = server.abort_token();
        let stop = Shutdown::from_token(shutdown.clone());
        let mut task = tokio::spawn(server.run(listener, stop.triggered()));
        state.send_replace(LifecycleState::Running);

        let mut listener_error = None;
        let mut timed_out = false;

        tokio::select! {
            result = &mut task => {
                // The server only returns early on a listener failure.
                listener_error = join_error(result);
                state.send_replace(LifecycleState::ShuttingDown);
            }
            _ = shutdown.cancelled() => {
                state.send_replace(LifecycleState::ShuttingDown);
                tracing::info!(grace = ?grace, "Draining in-flight requests");
                match drain(&mut task, grace).await {
                    Drain::Finished(result) => listener_error = join_error(result),
                    Drain::Aborted => {
                        abort.cancel();
                        timed_out = true;
                        tracing::warn!(grace = ?grace, "Grace period elapsed; in-flight requests cancelled");
                    }
                }
            }
        }

        state.send_replace(LifecycleState::Stopped);

        if let Some(e) = listener_error {
            tracing::error!(error = %e, "Listener failed");
            return Err(ServeError::Listener(e));
        }
        if timed_out {
            return Err(ServeError::ShutdownTimeout(grace));
        }
        tracing::info!("Shutdown complete");
        Ok(())
    }
}

fn join_error(
    result: Result<io::Result<()>, tokio::task::JoinError>,
) -> Option<io::Error> {
    match result {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e),
        Err(e) => Some(io::Error::other(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TemplateRenderer;

    fn local_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.listener.host = "127.0.0.1".into();
        config.listener.port = 0;
        config
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let pipeline = Arc::new(Pipeline::new(Arc::new(TemplateRenderer::new()), None));
        let service = Service::bind(local_config(), pipeline).await.unwrap();
        let mut states = service.subscribe();
        assert_eq!(*states.borrow(), LifecycleState::Starting);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(service.run(shutdown.clone()));

        states
            .wait_for(|s| *s == LifecycleState::Running)
            .await
            .unwrap();
        shutdown.cancel();

        handle.await.unwrap().unwrap();
        assert_eq!(*states.borrow(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_start_rejects_unknown_backend() {
        let mut config = local_config();
        config.pdf.backend = "nope".into();
        assert!(matches!(
            Service::start(config).await,
            Err(StartupError::Convertor(_))
        ));
    }

    #[test]
    fn test_join_error() {
        assert!(join_error(Ok(Ok(()))).is_none());
        let err = join_error(Ok(Err(io::Error::other("accept failed")))).unwrap();
        assert_eq!(err.to_string(), "accept failed");
    }
}
