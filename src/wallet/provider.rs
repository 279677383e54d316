//! Wallet provider capability port.
//!
//! The external signer (a Phantom-style browser extension, a hardware
//! wallet bridge, a test double) is injected behind this trait. The core
//! never reaches for an ambient global signer; absence of a provider is a
//! first-class classified error, not a crash.

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

/// Raw failure signals from a wallet provider, before classification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider is installed but cannot serve requests right now.
    #[error("wallet provider unavailable")]
    Unavailable,

    /// The user explicitly declined the request.
    #[error("user rejected the request")]
    Rejected,

    /// Anything else, carrying the provider's original message.
    #[error("{0}")]
    Other(String),
}

/// Capability interface of an external signing provider.
///
/// `sign_and_submit` is one atomic request at the provider: it signs the
/// transaction and broadcasts it, returning the signature. Waiting for
/// chain confirmation is layered on top by the submitter, not here.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Establish a session with the provider. With `only_if_trusted` the
    /// provider must not prompt the user and only succeeds if this origin
    /// was previously approved.
    async fn connect(&self, only_if_trusted: bool) -> Result<Pubkey, ProviderError>;

    /// Revoke the session at the provider.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Sign and broadcast a transaction as one request.
    async fn sign_and_submit(&self, transaction: Transaction) -> Result<Signature, ProviderError>;
}
