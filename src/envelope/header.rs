//! Envelope header: identity, digest and stamps.

use std::collections::BTreeMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::envelope::error::{EnvelopeError, EnvelopeResult};

/// Only digest algorithm envelopes are produced with.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Envelope header.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Unique identifier of the envelope.
    pub uuid: Uuid,

    /// Digest of the canonical document.
    pub dig: Digest,

    /// Stamps added by tax authorities or other providers.
    #[serde(default)]
    pub stamps: Vec<Stamp>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub meta: BTreeMap<String, String>,

    #[serde(default)]
    pub notes: Option<String>,

    /// Draft envelopes may still change and cannot be signed.
    #[serde(default)]
    pub draft: bool,
}

/// Document digest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Digest {
    pub alg: String,
    pub val: String,
}

/// A provider stamp, e.g. a tax agency signature code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stamp {
    pub prv: String,
    pub val: String,
}

impl Header {
    pub(crate) fn validate(&self) -> EnvelopeResult<()> {
        if self.uuid.is_nil() {
            return Err(EnvelopeError::invalid("head.uuid", "must not be nil"));
        }
        self.dig.validate()?;
        for (i, stamp) in self.stamps.iter().enumerate() {
            if stamp.prv.is_empty() {
                return Err(EnvelopeError::invalid(
                    format!("head.stamps[{}].prv", i),
                    "must not be empty",
                ));
            }
        }
        Ok(())
    }
}

impl Digest {
    fn validate(&self) -> EnvelopeResult<()> {
        if self.alg != DIGEST_ALGORITHM {
            return Err(EnvelopeError::invalid(
                "head.dig.alg",
                format!("unsupported algorithm '{}'", self.alg),
            ));
        }
        if self.val.len() != 64 || !self.val.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EnvelopeError::invalid(
                "head.dig.val",
                "must be 64 hexadecimal characters",
            ));
        }
        Ok(())
    }
}
