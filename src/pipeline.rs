//! Request pipeline: decode → render → convert.
//!
//! Stages run strictly in order and each is attempted once. Failures keep
//! their stage so callers can map them to distinct responses.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::envelope::{self, Envelope, EnvelopeError};
use crate::observability::metrics::{self, Stage};
use crate::pdf::{Attachment, Backend, ConvertOptions, Convertor, PdfError, GOBL_ATTACHMENT};
use crate::render::{HtmlRenderer, RenderError, RenderOptions, TemplateRenderer};

/// Failures of a single pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request body could not be read.
    #[error("reading request body: {0}")]
    Read(#[source] axum::Error),

    /// The body is not a valid envelope.
    #[error("unmarshalling GOBL envelope: {0}")]
    Decode(#[source] EnvelopeError),

    #[error("rendering HTML: {0}")]
    Render(#[source] RenderError),

    /// No convertor was configured at startup.
    #[error("no PDF convertor available")]
    ConvertUnavailable,

    #[error("converting to PDF: {0}")]
    Convert(#[source] PdfError),
}

impl PipelineError {
    /// Whether the client sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Read(_) | PipelineError::Decode(_))
    }
}

/// The collaborators a request is pushed through. Immutable and shared.
#[derive(Clone)]
pub struct Pipeline {
    renderer: Arc<dyn HtmlRenderer>,
    convertor: Option<Arc<dyn Convertor>>,
}

impl Pipeline {
    pub fn new(renderer: Arc<dyn HtmlRenderer>, convertor: Option<Arc<dyn Convertor>>) -> Self {
        Self {
            renderer,
            convertor,
        }
    }

    /// Built-in templates plus the convertor for `backend`.
    pub fn from_backend(backend: Backend) -> Self {
        Self::new(Arc::new(TemplateRenderer::new()), backend.into_convertor())
    }

    pub fn convertor_name(&self) -> Option<&'static str> {
        self.convertor.as_ref().map(|c| c.name())
    }

    /// Decode the raw body into a validated envelope.
    pub fn decode(&self, body: &[u8]) -> Result<Envelope, PipelineError> {
        let start = Instant::now();
        let result = envelope::decode(body).map_err(PipelineError::Decode);
        observe(Stage::Decode, result.is_ok(), start);
        result
    }

    /// Decode and render to HTML.
    pub async fn html(
        &self,
        cancel: &CancellationToken,
        body: &[u8],
        opts: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let env = self.decode(body)?;
        self.render(cancel, &env, opts).await
    }

    /// Run the full pipeline, embedding `body` itself as `gobl.json`.
    pub async fn pdf(
        &self,
        cancel: &CancellationToken,
        body: &[u8],
        opts: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let env = self.decode(body)?;
        let html = self.render(cancel, &env, opts).await?;
        drop(env);

        let convert_opts =
            ConvertOptions::default().with_attachment(Attachment::new(GOBL_ATTACHMENT, body));
        self.convert(cancel, &html, &convert_opts).await
    }

    async fn render(
        &self,
        cancel: &CancellationToken,
        env: &Envelope,
        opts: &RenderOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let start = Instant::now();
        let result = self
            .renderer
            .render(cancel, env, opts)
            .await
            .map_err(PipelineError::Render);
        observe(Stage::Render, result.is_ok(), start);
        result
    }

    async fn convert(
        &self,
        cancel: &CancellationToken,
        html: &[u8],
        opts: &ConvertOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let convertor = self
            .convertor
            .as_ref()
            .ok_or(PipelineError::ConvertUnavailable)?;
        let start = Instant::now();
        let result = convertor
            .html(cancel, html, opts)
            .await
            .map_err(PipelineError::Convert);
        observe(Stage::Convert, result.is_ok(), start);
        result
    }
}

fn observe(stage: Stage, ok: bool, start: Instant) {
    tracing::debug!(
        stage = stage.as_str(),
        ok,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Stage finished"
    );
    metrics::record_stage(stage, ok, start);
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("convertor", &self.convertor_name())
            .finish()
    }
}

/// Test doubles for the pipeline's collaborators.
#[doc(hidden)]
pub mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use tokio_util::sync::CancellationToken;

    use crate::envelope::Envelope;
    use crate::pdf::{ConvertOptions, Convertor, PdfError};
    use crate::render::{HtmlRenderer, RenderError, RenderOptions, TemplateRenderer};

    /// Wraps the template renderer and counts calls.
    #[derive(Debug, Default)]
    pub struct CountingRenderer {
        calls: AtomicUsize,
    }

    impl CountingRenderer {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HtmlRenderer for CountingRenderer {
        async fn render(
            &self,
            cancel: &CancellationToken,
            env: &Envelope,
            opts: &RenderOptions,
        ) -> Result<Vec<u8>, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            TemplateRenderer::new().render(cancel, env, opts).await
        }
    }

    /// Records every conversion and answers with a fake PDF.
    #[derive(Debug, Default)]
    pub struct RecordingConvertor {
        pub delay: Option<Duration>,
        pub fail: bool,
        calls: Mutex<Vec<ConvertOptions>>,
        tokens: Mutex<Vec<CancellationToken>>,
        started: Notify,
    }

    impl RecordingConvertor {
        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Options passed to each call, oldest first.
        pub fn calls(&self) -> Vec<ConvertOptions> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        /// Cancellation tokens handed to each call, oldest first.
        pub fn tokens(&self) -> Vec<CancellationToken> {
            self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
        }

        /// Resolves once a conversion has begun.
        pub async fn started(&self) {
            self.started.notified().await
        }
    }

    #[async_trait]
    impl Convertor for RecordingConvertor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn html(
            &self,
            cancel: &CancellationToken,
            html: &[u8],
            opts: &ConvertOptions,
        ) -> Result<Vec<u8>, PdfError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(opts.clone());
            }
            if let Ok(mut tokens) = self.tokens.lock() {
                tokens.push(cancel.clone());
            }
            self.started.notify_one();
            if let Some(delay) = self.delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(PdfError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            if self.fail {
                return Err(PdfError::Process {
                    program: "recording".into(),
                    detail: "exit status: 1".into(),
                });
            }
            let mut pdf = b"%PDF-1.7\n".to_vec();
            pdf.extend_from_slice(&(html.len() as u64).to_be_bytes());
            Ok(pdf)
        }
    }
}
