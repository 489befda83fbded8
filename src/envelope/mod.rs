//! Envelope decoding subsystem.
//!
//! # Data Flow
//! ```text
//! raw request bytes
//!     → serde_json (strict: unknown envelope/header fields rejected)
//!     → header.rs (identity, digest, stamps)
//!     → document.rs (typed bills, raw JSON for other documents)
//!     → Envelope::validate (cross-field rules)
//! ```
//!
//! # Design Decisions
//! - Decoding and validation are a single step for callers: `decode`
//! - The original bytes are never re-serialized; callers keep them

pub mod document;
pub mod error;
pub mod header;

use serde::Deserialize;

pub use document::{Bill, Document, Party};
pub use error::{EnvelopeError, EnvelopeResult};
pub use header::{Digest, Header, Stamp};

/// Schema URL every envelope must declare.
pub const ENVELOPE_SCHEMA: &str = "https://gobl.org/draft-0/envelope";

/// A signed (or draft) container for one business document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub head: Header,
    pub doc: Document,
    #[serde(default)]
    pub sigs: Vec<String>,
}

impl Envelope {
    /// Check the rules serde cannot express.
    pub fn validate(&self) -> EnvelopeResult<()> {
        if self.schema != ENVELOPE_SCHEMA {
            return Err(EnvelopeError::invalid(
                "$schema",
                format!("expected '{}', got '{}'", ENVELOPE_SCHEMA, self.schema),
            ));
        }
        self.head.validate()?;
        if self.head.draft && !self.sigs.is_empty() {
            return Err(EnvelopeError::invalid("sigs", "draft envelopes cannot be signed"));
        }
        self.doc.validate()
    }

    pub fn is_draft(&self) -> bool {
        self.head.draft
    }
}

/// Decode and validate an envelope from raw JSON bytes.
pub fn decode(bytes: &[u8]) -> EnvelopeResult<Envelope> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    envelope.validate()?;
    Ok(envelope)
}
