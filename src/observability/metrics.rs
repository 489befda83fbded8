//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gobl_html_requests_total` (counter): requests by response status
//! - `gobl_html_request_duration_seconds` (histogram): end-to-end latency
//! - `gobl_html_stage_duration_seconds` (histogram): per pipeline stage and outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// A step of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Render,
    Convert,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Render => "render",
            Stage::Convert => "convert",
        }
    }
}

/// Install the Prometheus recorder with its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a completed HTTP request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("gobl_html_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("gobl_html_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record how long a pipeline stage took.
pub fn record_stage(stage: Stage, ok: bool, start: Instant) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::histogram!(
        "gobl_html_stage_duration_seconds",
        "stage" => stage.as_str(),
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}
