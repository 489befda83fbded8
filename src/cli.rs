//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::ServiceConfig;
use crate::render::{Layout, Locale};

#[derive(Parser, Debug)]
#[command(name = "gobl-html", version, about = "Render GOBL envelopes as HTML and PDF")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP conversion endpoint
    Serve(ServeArgs),
    /// Render a local envelope file
    Render(RenderArgs),
}

/// Convertor selection shared by both commands.
#[derive(Args, Debug, Clone, Default)]
pub struct PdfArgs {
    /// PDF convertor (prince, weasyprint, gotenberg)
    #[arg(long = "pdf")]
    pub backend: Option<String>,

    /// URL of the remote convertor
    #[arg(long = "pdf-url")]
    pub url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub host: Option<String>,

    #[command(flatten)]
    pub pdf: PdfArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    Html,
    #[default]
    Pdf,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Envelope to render, or `-` for stdin
    pub input: PathBuf,

    /// Output file; stdout when missing or `-`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pdf)]
    pub format: OutputFormat,

    #[arg(long, default_value = "a4")]
    pub layout: Layout,

    #[arg(long)]
    pub locale: Option<Locale>,

    #[command(flatten)]
    pub pdf: PdfArgs,
}

impl PdfArgs {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(backend) = &self.backend {
            config.pdf.backend = backend.clone();
        }
        if let Some(url) = &self.url {
            config.pdf.url = Some(url.clone());
        }
    }
}

impl Command {
    /// Apply command-line overrides on top of the file configuration.
    pub fn apply(&self, config: &mut ServiceConfig) {
        match self {
            Command::Serve(args) => {
                if let Some(port) = args.port {
                    config.listener.port = port;
                }
                if let Some(host) = &args.host {
                    config.listener.host = host.clone();
                }
                args.pdf.apply(config);
            }
            Command::Render(args) => args.pdf.apply(config),
        }
    }
}

/// `-` stands for the standard stream.
pub fn is_stdio(path: &std::path::Path) -> bool {
    path.as_os_str() == "-"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::parse_from([
            "gobl-html", "serve", "-p", "8080", "--pdf", "gotenberg", "--pdf-url", "http://pdf:3000",
        ]);
        let mut config = ServiceConfig::default();
        cli.command.apply(&mut config);

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.pdf.backend, "gotenberg");
        assert_eq!(config.pdf.url.as_deref(), Some("http://pdf:3000"));
    }

    #[test]
    fn test_render_args() {
        let cli = Cli::parse_from([
            "gobl-html", "--config", "svc.toml", "render", "invoice.json", "--format", "html",
            "--layout", "letter", "--locale", "es",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("svc.toml")));
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.format, OutputFormat::Html);
                assert_eq!(args.layout, Layout::Letter);
                assert_eq!(args.locale, Some(Locale::Es));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["gobl-html", "serve"]);
        let mut config = ServiceConfig::default();
        config.pdf.backend = "prince".into();
        cli.command.apply(&mut config);
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.pdf.backend, "prince");
    }
}
