//! Purchase error taxonomy and classification.
//!
//! # Responsibilities
//! - Define the closed set of errors the UI layer is allowed to see
//! - Classify raw provider/ledger/backend failures into that set
//! - Preserve original messages for anything unrecognized
//!
//! # Design Decisions
//! - Classification happens at subsystem boundaries via `From` impls, so
//!   no call site ever surfaces a raw provider or RPC error
//! - Errors that carry a signature (timeout, on-chain failure) keep it, so
//!   the user can be pointed at an explorer instead of losing the attempt

use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::purchase::backend::BackendError;
use crate::tx::intent::IntentError;
use crate::wallet::provider::ProviderError;

/// Classified purchase failures. This is the complete set surfaced to
/// callers; raw errors from the provider, ledger RPC, or backend never
/// escape unclassified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PurchaseError {
    /// No wallet provider is available; the user must install/enable one.
    #[error("no wallet provider available")]
    ProviderMissing,

    /// The user declined the request in their wallet.
    #[error("transaction rejected by user")]
    UserRejected,

    /// The payer does not hold enough SOL for the transfer plus fees.
    #[error("insufficient SOL balance")]
    InsufficientFunds,

    /// The transaction's blockhash is no longer valid; the next attempt
    /// must rebuild with a fresh one.
    #[error("transaction expired, blockhash no longer valid")]
    BlockhashExpired,

    /// Confirmation did not arrive within the timeout. The outcome is
    /// ambiguous; the transaction may still land.
    #[error("confirmation timed out for transaction {signature}")]
    ConfirmationTimeout { signature: Signature },

    /// The transaction settled on chain with an error payload. Terminal
    /// for this signature; retrying means a brand-new transaction.
    #[error("transaction {signature} failed on chain: {reason}")]
    OnChainFailure { signature: Signature, reason: String },

    /// The purchase backend could not be reached or returned an error.
    #[error("purchase backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Anything we could not recognize, surfaced with its original message.
    #[error("{0}")]
    Unclassified(String),
}

impl PurchaseError {
    /// Classify a raw failure message by its content, mirroring the
    /// message shapes wallet providers actually produce.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("rejected") || lower.contains("declined") {
            Self::UserRejected
        } else if lower.contains("insufficient") {
            Self::InsufficientFunds
        } else if lower.contains("blockhash") || lower.contains("expired") {
            Self::BlockhashExpired
        } else {
            Self::Unclassified(message.to_string())
        }
    }

    /// Whether the flow may retry from the `initiated` step after this
    /// failure. `ProviderMissing` is fatal to the attempt; everything else
    /// either retries directly or (for on-chain outcomes) retries via a
    /// brand-new transaction.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ProviderMissing)
    }

    /// The signature attached to this failure, when one exists. Present
    /// for ambiguous or settled outcomes so the attempt is never lost.
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::ConfirmationTimeout { signature } => Some(signature),
            Self::OnChainFailure { signature, .. } => Some(signature),
            _ => None,
        }
    }
}

impl From<ProviderError> for PurchaseError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable => Self::ProviderMissing,
            ProviderError::Rejected => Self::UserRejected,
            ProviderError::Other(message) => Self::classify(&message),
        }
    }
}

impl From<LedgerError> for PurchaseError {
    fn from(err: LedgerError) -> Self {
        Self::Unclassified(format!("ledger rpc: {err}"))
    }
}

impl From<BackendError> for PurchaseError {
    fn from(err: BackendError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

impl From<IntentError> for PurchaseError {
    fn from(err: IntentError) -> Self {
        Self::Unclassified(err.to_string())
    }
}
