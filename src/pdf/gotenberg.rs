//! Remote convertor speaking the Gotenberg HTTP API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::pdf::{ConvertOptions, Convertor, PdfError};

const HTML_ROUTE: &str = "forms/chromium/convert/html";

/// Client for a Gotenberg instance.
#[derive(Debug, Clone)]
pub struct GotenbergConvertor {
    client: reqwest::Client,
    endpoint: Url,
}

impl GotenbergConvertor {
    pub fn new(base: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base)
    }

    pub fn with_client(client: reqwest::Client, mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        // Joining a relative path onto a directory URL cannot fail.
        let endpoint = base.join(HTML_ROUTE).unwrap_or(base);
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn form(html: &[u8], opts: &ConvertOptions) -> Result<Form, PdfError> {
        let index = Part::bytes(html.to_vec())
            .file_name("index.html")
            .mime_str("text/html")?;
        let mut form = Form::new().part("files", index);
        for attachment in &opts.attachments {
            let part = Part::bytes(attachment.data.clone()).file_name(attachment.filename.clone());
            form = form.part("embeds", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Convertor for GotenbergConvertor {
    fn name(&self) -> &'static str {
        "gotenberg"
    }

    async fn html(
        &self,
        cancel: &CancellationToken,
        html: &[u8],
        opts: &ConvertOptions,
    ) -> Result<Vec<u8>, PdfError> {
        let form = Self::form(html, opts)?;
        let request = async {
            let response = self
                .client
                .post(self.endpoint.clone())
                .multipart(form)
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PdfError::Remote {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(response.bytes().await?.to_vec())
        };

        let pdf = tokio::select! {
            _ = cancel.cancelled() => return Err(PdfError::Cancelled),
            result = request => result?,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            bytes = pdf.len(),
            attachments = opts.attachments.len(),
            "PDF generated"
        );
        Ok(pdf)
    }
}
