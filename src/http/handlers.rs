//! Route handlers.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::request::RequestId;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::pipeline::PipelineError;
use crate::render::{assets, RenderOptions};

/// `POST /`: turn a GOBL envelope into a PDF.
///
/// The request token fires when this future is dropped (client disconnect,
/// request timeout) or when the server is forcibly stopped.
pub async fn generate_pdf(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Body,
) -> Response {
    let start = Instant::now();
    let cancel = state.cancel.child_token();
    let _guard = cancel.clone().drop_guard();

    let result = async {
        let body = axum::body::to_bytes(body, state.max_body_bytes)
            .await
            .map_err(PipelineError::Read)?;
        tracing::debug!(request_id = %request_id, bytes = body.len(), "Envelope received");
        state
            .pipeline
            .pdf(&cancel, &body, &RenderOptions::for_pdf())
            .await
    }
    .await;

    let response = match result {
        Ok(pdf) => {
            tracing::info!(
                request_id = %request_id,
                bytes = pdf.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "PDF generated"
            );
            ([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response()
        }
        Err(err) if err.is_client_error() => {
            tracing::warn!(request_id = %request_id, error = %err, "Rejected request");
            err.into_response()
        }
        Err(err) => {
            tracing::error!(request_id = %request_id, error = %err, "Request failed");
            err.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}

/// `GET /styles/{file}`: serve an embedded stylesheet.
pub async fn stylesheet(Path(file): Path<String>) -> Response {
    match assets::stylesheet(&file) {
        Some(css) => ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css).into_response(),
        None => (StatusCode::NOT_FOUND, "stylesheet not found").into_response(),
    }
}
