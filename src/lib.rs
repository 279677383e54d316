//! PhotoPay client core: payment orchestration for buying digital-art
//! listings on Solana.
//!
//! # Architecture Overview
//!
//! ```text
//! PurchaseEngine::begin ──▶ backend "initiate" ──▶ PaymentIntent
//!                                                     │
//!                                    fresh blockhash  ▼
//! PurchaseFlow::sign ──▶ tx::builder ──▶ WalletSession::sign_and_submit
//!                                                     │ signature
//!                                                     ▼
//!                        tx::submitter (confirmation watch ⟂ timeout)
//!                                                     │ confirmed
//!                                                     ▼
//!                        backend "confirm" ──▶ PurchaseRecord (terminal)
//! ```
//!
//! Every failure along the way is classified into [`PurchaseError`] before
//! it surfaces; the UI layer never sees raw provider or RPC errors. The
//! wallet provider, ledger RPC, and purchase backend are all injected
//! behind traits, so the whole flow runs against mocks in tests.

// Core subsystems
pub mod config;
pub mod error;
pub mod ledger;
pub mod purchase;
pub mod tx;
pub mod wallet;

pub use config::{load_config, ClientConfig};
pub use error::PurchaseError;
pub use ledger::{LedgerRpc, NetworkReference, RpcLedger};
pub use purchase::{
    FlowError, FlowEvent, HttpBackend, PurchaseBackend, PurchaseEngine, PurchaseFlow, Step,
};
pub use tx::{build_transfer, sol_to_lamports, PaymentIntent, TransactionSubmitter};
pub use wallet::{SessionEvent, WalletProvider, WalletSession};
