//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID assigned and echoed)
//!     → handlers.rs (body read, pipeline run)
//!     → error.rs (failures as JSON `{"message": ...}`)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
