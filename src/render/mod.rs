//! HTML rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Envelope + RenderOptions
//!     → TemplateRenderer (picks a template by document schema)
//!     → templates.rs (maud markup, i18n.rs labels)
//!     → assets.rs (stylesheets inlined or linked)
//!     → HTML bytes
//! ```
//!
//! # Design Decisions
//! - Renderers sit behind `HtmlRenderer` so the request pipeline can be
//!   exercised without real templates
//! - Every render call takes the request's cancellation token

pub mod assets;
pub mod i18n;
pub mod options;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::envelope::{Document, Envelope};
use templates::BillKind;

pub use options::{Layout, Locale, RenderOptions};

/// Errors raised while generating HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template exists for the document's schema.
    #[error("unsupported document type '{0}'")]
    UnsupportedDocument(String),

    /// The request was cancelled before rendering finished.
    #[error("rendering cancelled")]
    Cancelled,
}

/// Turns a validated envelope into an HTML document.
#[async_trait]
pub trait HtmlRenderer: Send + Sync {
    async fn render(
        &self,
        cancel: &CancellationToken,
        env: &Envelope,
        opts: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Renderer backed by the built-in maud templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer;

impl TemplateRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render synchronously to a string.
    pub fn render_string(&self, env: &Envelope, opts: &RenderOptions) -> Result<String, RenderError> {
        let markup = match &env.doc {
            Document::Invoice(bill) => templates::bill_page(env, BillKind::Invoice, bill, opts),
            Document::Order(bill) => templates::bill_page(env, BillKind::Order, bill, opts),
            Document::Other { schema, .. } => {
                return Err(RenderError::UnsupportedDocument(schema.clone()))
            }
        };
        Ok(markup.into_string())
    }
}

#[async_trait]
impl HtmlRenderer for TemplateRenderer {
    async fn render(
        &self,
        cancel: &CancellationToken,
        env: &Envelope,
        opts: &RenderOptions,
    ) -> Result<Vec<u8>, RenderError> {
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        let html = self.render_string(env, opts)?;
        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        tracing::debug!(
            schema = env.doc.schema(),
            layout = %opts.layout,
            bytes = html.len(),
            "HTML rendered"
        );
        Ok(html.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::decode;
    use serde_json::{json, Value};

    const INVOICE: &str = include_str!("../../tests/fixtures/invoice.json");

    fn envelope(edit: impl FnOnce(&mut Value)) -> Envelope {
        let mut value: Value = serde_json::from_str(INVOICE).unwrap();
        edit(&mut value);
        decode(&serde_json::to_vec(&value).unwrap()).unwrap()
    }

    async fn render(env: &Envelope, opts: &RenderOptions) -> Result<String, RenderError> {
        let bytes = TemplateRenderer::new()
            .render(&CancellationToken::new(), env, opts)
            .await?;
        Ok(String::from_utf8(bytes).unwrap())
    }

    #[tokio::test]
    async fn test_invoice_content() {
        let html = render(&envelope(|_| {}), &RenderOptions::for_pdf()).await.unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Invoice SAMPLE-001</title>"));
        assert!(html.contains("Provide One S.L."));
        assert!(html.contains("Sample Consumer"));
        assert!(html.contains("ESB98602642"));
        assert!(html.contains("Development services"));
        assert!(html.contains("1960.20 EUR"));
        assert!(html.contains("ES06 0128 0011 3901 0008 1391"));
        assert!(html.contains("Thank you for your business"));
        assert!(html.contains("class=\"watermark\""));
    }

    #[tokio::test]
    async fn test_embedded_stylesheets() {
        let html = render(&envelope(|_| {}), &RenderOptions::for_pdf()).await.unwrap();
        assert!(html.contains("<style>"));
        assert!(html.contains("size: A4"));
        assert!(!html.contains("/styles/"));
    }

    #[tokio::test]
    async fn test_linked_stylesheets_and_letter_layout() {
        let opts = RenderOptions::new().with_layout(Layout::Letter);
        let html = render(&envelope(|_| {}), &opts).await.unwrap();
        assert!(html.contains(r#"href="/styles/main.css""#));
        assert!(html.contains(r#"href="/styles/letter.css""#));
        assert!(html.contains("layout-letter"));
        assert!(!html.contains("<style>"));
    }

    #[tokio::test]
    async fn test_spanish_labels() {
        let opts = RenderOptions::for_pdf().with_locale(Locale::Es);
        let html = render(&envelope(|_| {}), &opts).await.unwrap();
        assert!(html.contains(r#"lang="es""#));
        assert!(html.contains("Factura"));
        assert!(html.contains("Borrador"));
    }

    #[tokio::test]
    async fn test_order_title_and_no_watermark() {
        let env = envelope(|v| {
            v["doc"]["$schema"] = json!("https://gobl.org/draft-0/bill/order");
            v["head"]["draft"] = json!(false);
        });
        let html = render(&env, &RenderOptions::for_pdf()).await.unwrap();
        assert!(html.contains("<h1>Order</h1>"));
        assert!(!html.contains("watermark\""));
    }

    #[tokio::test]
    async fn test_content_is_escaped() {
        let env = envelope(|v| {
            v["doc"]["supplier"]["name"] = json!("<script>alert(1)</script>");
        });
        let html = render(&env, &RenderOptions::for_pdf()).await.unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_unsupported_document() {
        let env = envelope(|v| {
            v["doc"] = json!({"$schema": "https://gobl.org/draft-0/note/message", "content": "hi"});
        });
        let err = render(&env, &RenderOptions::for_pdf()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported document type 'https://gobl.org/draft-0/note/message'"
        );
    }

    #[tokio::test]
    async fn test_cancelled_token() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = TemplateRenderer::new()
            .render(&cancel, &envelope(|_| {}), &RenderOptions::for_pdf())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Cancelled));
    }
}
