//! GOBL envelope rendering service library

pub mod cli;
pub mod config;
pub mod envelope;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pdf;
pub mod pipeline;
pub mod render;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{LifecycleState, ServeError, Service, Shutdown};
pub use pipeline::{Pipeline, PipelineError};
