//! Ledger boundary subsystem.
//!
//! # Data Flow
//! ```text
//! cluster RPC endpoint (from config)
//!     → client.rs (LedgerRpc trait + timeout-bounded RPC calls)
//!     → types.rs (NetworkReference, ledger errors)
//! ```

pub mod client;
pub mod types;

pub use client::{LedgerRpc, RpcLedger};
pub use types::{LedgerError, LedgerResult, NetworkReference};
