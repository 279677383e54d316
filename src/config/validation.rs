//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges (timeouts > 0)
//! - Restrict commitment to the levels the ledger accepts
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ClientConfig;
use thiserror::Error;

/// A single semantic configuration problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("unknown commitment level '{0}' (expected processed, confirmed or finalized)")]
    UnknownCommitment(String),

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.backend.base_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "backend.base_url",
            value: config.backend.base_url.clone(),
        });
    }

    if url::Url::parse(&config.ledger.rpc_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "ledger.rpc_url",
            value: config.ledger.rpc_url.clone(),
        });
    }

    if !matches!(
        config.ledger.commitment.as_str(),
        "processed" | "confirmed" | "finalized"
    ) {
        errors.push(ValidationError::UnknownCommitment(
            config.ledger.commitment.clone(),
        ));
    }

    for (field, value) in [
        ("backend.request_timeout_secs", config.backend.request_timeout_secs),
        ("ledger.rpc_timeout_secs", config.ledger.rpc_timeout_secs),
        ("ledger.confirm_timeout_ms", config.ledger.confirm_timeout_ms),
        (
            "ledger.confirm_poll_interval_ms",
            config.ledger.confirm_poll_interval_ms,
        ),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
