//! Ledger RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Fetch fresh blockhashes with their expiry watermark
//! - Query signature status for confirmation watches
//! - Handle timeouts and network errors gracefully
//!
//! # Design Decisions
//! - The `LedgerRpc` trait is the seam for tests: the purchase flow only
//!   ever talks to the trait, so a scripted mock can stand in for a live
//!   cluster
//! - Every RPC call is bounded by the configured timeout

use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use tokio::time::timeout;

use crate::config::LedgerConfig;
use crate::ledger::types::{LedgerError, LedgerResult, NetworkReference};

/// Read-side ledger boundary consumed by the builder caller and the
/// confirmation watch.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Fetch the latest blockhash and its last-valid block height.
    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> LedgerResult<NetworkReference>;

    /// Probe a signature's status at the given commitment. `None` means
    /// the ledger has not seen it settle yet; `Some(Err(reason))` is an
    /// on-chain error payload.
    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> LedgerResult<Option<Result<(), String>>>;

    /// Current block height at the given commitment, used to detect
    /// blockhash expiry.
    async fn block_height(&self, commitment: CommitmentConfig) -> LedgerResult<u64>;
}

/// `LedgerRpc` over a JSON-RPC cluster endpoint.
pub struct RpcLedger {
    rpc: RpcClient,
    timeout_duration: Duration,
}

impl RpcLedger {
    /// Create a client against the configured endpoint.
    pub fn new(config: &LedgerConfig) -> Self {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        tracing::info!(
            rpc_url = %config.rpc_url,
            commitment = %config.commitment,
            "ledger client initialized"
        );
        Self {
            rpc: RpcClient::new_with_timeout(config.rpc_url.clone(), timeout_duration),
            timeout_duration,
        }
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout_duration.as_secs()
    }
}

#[async_trait]
impl LedgerRpc for RpcLedger {
    async fn latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> LedgerResult<NetworkReference> {
        let fut = self.rpc.get_latest_blockhash_with_commitment(commitment);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok((blockhash, last_valid_block_height))) => Ok(NetworkReference {
                blockhash,
                last_valid_block_height,
            }),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.timeout_secs())),
        }
    }

    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> LedgerResult<Option<Result<(), String>>> {
        let fut = self
            .rpc
            .get_signature_status_with_commitment(signature, commitment);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(status)) => Ok(status.map(|outcome| outcome.map_err(|e| e.to_string()))),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.timeout_secs())),
        }
    }

    async fn block_height(&self, commitment: CommitmentConfig) -> LedgerResult<u64> {
        let fut = self.rpc.get_block_height_with_commitment(commitment);
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(height)) => Ok(height),
            Ok(Err(e)) => Err(LedgerError::Rpc(e.to_string())),
            Err(_) => Err(LedgerError::Timeout(self.timeout_secs())),
        }
    }
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("rpc_url", &self.rpc.url())
            .field("timeout_secs", &self.timeout_secs())
            .finish()
    }
}
