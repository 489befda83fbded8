//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the PDF backend from configuration
//! - Build the request pipeline
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::pdf::{Backend, PdfError};
use crate::pipeline::Pipeline;

/// Errors that prevent the service from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("preparing PDF convertor: {0}")]
    Convertor(#[from] PdfError),

    #[error("binding {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the pipeline described by `config`.
pub fn build_pipeline(config: &ServiceConfig) -> Result<Pipeline, StartupError> {
    let backend = Backend::from_config(&config.pdf)?;
    let pipeline = Pipeline::from_backend(backend);
    match pipeline.convertor_name() {
        Some(name) => tracing::info!(convertor = name, "PDF convertor ready"),
        None => tracing::warn!("No PDF convertor configured; requests will fail after rendering"),
    }
    Ok(pipeline)
}

/// Bind the configured listener address.
pub async fn bind(config: &ServiceConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Pipeline and listener, ready to serve.
pub(crate) async fn prepare(
    config: &ServiceConfig,
    pipeline: Option<Arc<Pipeline>>,
) -> Result<(Arc<Pipeline>, TcpListener), StartupError> {
    let pipeline = match pipeline {
        Some(p) => p,
        None => Arc::new(build_pipeline(config)?),
    };
    let listener = bind(config).await?;
    Ok((pipeline, listener))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_backend_is_fatal() {
        let mut config = ServiceConfig::default();
        config.pdf.backend = "wkhtmltopdf".into();
        let err = build_pipeline(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "preparing PDF convertor: unknown PDF convertor 'wkhtmltopdf'"
        );
    }

    #[test]
    fn test_gotenberg_without_url_is_fatal() {
        let mut config = ServiceConfig::default();
        config.pdf.backend = "gotenberg".into();
        assert!(matches!(
            build_pipeline(&config),
            Err(StartupError::Convertor(PdfError::MissingUrl(_)))
        ));
    }

    #[test]
    fn test_no_backend() {
        let pipeline = build_pipeline(&ServiceConfig::default()).unwrap();
        assert_eq!(pipeline.convertor_name(), None);
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = ServiceConfig::default();
        config.listener.host = "127.0.0.1".into();
        config.listener.port = taken.local_addr().unwrap().port();

        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }
}
