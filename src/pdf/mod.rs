//! PDF conversion subsystem.
//!
//! # Data Flow
//! ```text
//! startup:  PdfConfig → backend.rs (Backend enum) → Arc<dyn Convertor>
//! request:  HTML bytes + attachments
//!     → local.rs (prince / weasyprint subprocess)
//!     → gotenberg.rs (remote multipart API)
//!     → PDF bytes
//! ```
//!
//! # Design Decisions
//! - Backend is resolved once; requests only see the `Convertor` trait
//! - Convertors are immutable and shared across concurrent requests
//! - Every conversion races the request's cancellation token

pub mod backend;
pub mod gotenberg;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use backend::Backend;
pub use gotenberg::GotenbergConvertor;
pub use local::{LocalConvertor, LocalTool};

/// File name the source envelope is embedded under.
pub const GOBL_ATTACHMENT: &str = "gobl.json";

/// A file embedded inside the generated PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Per-conversion options.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub attachments: Vec<Attachment>,
}

impl ConvertOptions {
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Errors raised by convertor construction or conversion.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("unknown PDF convertor '{0}'")]
    UnknownBackend(String),

    #[error("PDF convertor '{0}' requires a URL")]
    MissingUrl(&'static str),

    #[error("invalid convertor URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("'{program}' failed: {detail}")]
    Process { program: String, detail: String },

    #[error("convertor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("convertor responded with {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("conversion cancelled")]
    Cancelled,
}

/// Converts HTML documents to PDF.
#[async_trait]
pub trait Convertor: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn html(
        &self,
        cancel: &CancellationToken,
        html: &[u8],
        opts: &ConvertOptions,
    ) -> Result<Vec<u8>, PdfError>;
}
