//! gobl-html
//!
//! Renders GOBL envelopes to HTML and PDF, either as an HTTP service or
//! one file at a time from the command line.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST / (JSON envelope)
//!         │
//!         ▼
//!     ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!     │   http   │──▶│ envelope │──▶│  render  │──▶│   pdf    │
//!     │ handlers │   │  decode  │   │  (maud)  │   │ convertor│
//!     └──────────┘   └──────────┘   └──────────┘   └──────────┘
//!         ▲                                             │
//!         └──────────── application/pdf ◀───────────────┘
//!
//!     lifecycle: Starting → Running → ShuttingDown → Stopped
//! ```

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use gobl_html::cli::{self, Cli, Command, OutputFormat, RenderArgs};
use gobl_html::config::{load_config, ServiceConfig};
use gobl_html::lifecycle::{self, Service, Shutdown};
use gobl_html::observability::{logging, metrics};
use gobl_html::render::RenderOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), |c| cli.command.apply(c))?;

    logging::init(&config.observability)?;

    match cli.command {
        Command::Serve(_) => serve(config).await,
        Command::Render(args) => render(config, args).await,
    }
}

async fn serve(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gobl-html starting");

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        pdf_backend = %config.pdf.backend,
        shutdown_grace_secs = config.timeouts.shutdown_grace_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let service = Service::start(config).await?;
    tracing::info!(address = %service.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    lifecycle::spawn_signal_handler(shutdown.clone());
    service.run(shutdown.subscribe()).await?;
    Ok(())
}

async fn render(config: ServiceConfig, args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let body = read_input(&args.input).await?;
    let pipeline = Arc::new(lifecycle::build_pipeline(&config)?);

    let mut opts = RenderOptions::new()
        .with_embedded_stylesheets()
        .with_layout(args.layout);
    if let Some(locale) = args.locale {
        opts = opts.with_locale(locale);
    }

    let shutdown = Shutdown::new();
    let cancel = shutdown.subscribe();
    let signals = lifecycle::spawn_signal_handler(shutdown.clone());

    let output = match args.format {
        OutputFormat::Html => pipeline.html(&cancel, &body, &opts).await,
        OutputFormat::Pdf => pipeline.pdf(&cancel, &body, &opts).await,
    };
    signals.abort();
    if output.is_err() && shutdown.is_triggered() {
        tracing::warn!(input = %args.input.display(), "Render interrupted by signal");
    }
    let output = output?;

    write_output(args.output.as_deref(), &output).await?;
    tracing::debug!(bytes = output.len(), format = ?args.format, "Render complete");
    Ok(())
}

async fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    if cli::is_stdio(path) {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        tokio::fs::read(path).await
    }
}

async fn write_output(path: Option<&Path>, data: &[u8]) -> std::io::Result<()> {
    match path {
        Some(path) if !cli::is_stdio(path) => tokio::fs::write(path, data).await,
        _ => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(data).await?;
            stdout.flush().await
        }
    }
}
