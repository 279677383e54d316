//! Purchase flow states, events, and errors.

use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::error::PurchaseError;

/// Position in the purchase state machine.
///
/// ```text
/// idle → initiating → initiated → signing → confirming → success
///                        ↑  ↓cancel      ↘ failure ↙
///                        ↑  idle          initiated (retry point)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Idle,
    Initiating,
    Initiated,
    Signing,
    Confirming,
    Success,
}

/// Notifications emitted as a flow progresses, for observers (toast layer,
/// progress UI) decoupled from control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    Step(Step),
    Failed(PurchaseError),
}

/// Outcome of one submitted transaction attempt. Created only after a
/// successful sign step; a failed or expired attempt is never retried —
/// the next attempt is a brand-new transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub signature: Signature,
    pub status: TxStatus,
}

/// Settlement status of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed(String),
    Expired,
    TimedOut,
}

/// Errors from driving the purchase state machine.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A flow for this (listing, buyer) pair is already in progress.
    #[error("a purchase for listing {0} is already in progress")]
    AlreadyActive(String),

    /// The wallet session has no connected address.
    #[error("wallet not connected")]
    NotConnected,

    /// The connected wallet changed after the intent was issued.
    #[error("connected wallet does not match the payment intent")]
    WalletChanged,

    /// The requested operation is not valid at the current step.
    #[error("operation not valid in step {step:?}")]
    WrongStep { step: Step },

    /// A classified purchase failure.
    #[error(transparent)]
    Purchase(#[from] PurchaseError),
}

impl FlowError {
    /// The classified failure inside this error, if it is one.
    pub fn purchase_error(&self) -> Option<&PurchaseError> {
        match self {
            Self::Purchase(err) => Some(err),
            _ => None,
        }
    }
}
