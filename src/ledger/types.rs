//! Ledger-specific types and error definitions.

use solana_sdk::hash::Hash;
use thiserror::Error;

/// Short-lived anchor to recent ledger state. Must be fetched immediately
/// before building each transaction attempt; reuse across a retry causes
/// deterministic rejection once it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkReference {
    /// Recent blockhash the transaction is anchored to.
    pub blockhash: Hash,
    /// Block height after which the blockhash is no longer valid.
    pub last_valid_block_height: u64,
}

/// Errors from the ledger RPC boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("rpc timeout after {0} seconds")]
    Timeout(u64),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "rpc timeout after 10 seconds");

        let err = LedgerError::Rpc("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
