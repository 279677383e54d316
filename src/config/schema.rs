//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so a minimal (or empty) config still works.

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

/// Root configuration for the purchase client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Purchase backend settings.
    pub backend: BackendConfig,

    /// Ledger RPC settings.
    pub ledger: LedgerConfig,

    /// Payment shaping settings.
    pub payment: PaymentConfig,
}

/// Purchase backend (HTTP API) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the purchase backend.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://photopay-backend.onrender.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Ledger RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Commitment level for blockhash fetches and confirmation watches
    /// ("processed", "confirmed" or "finalized").
    pub commitment: String,

    /// Timeout for individual RPC calls, in seconds.
    pub rpc_timeout_secs: u64,

    /// Overall deadline for a confirmation watch, in milliseconds.
    pub confirm_timeout_ms: u64,

    /// Interval between signature status polls, in milliseconds.
    pub confirm_poll_interval_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            rpc_timeout_secs: 10,
            confirm_timeout_ms: 60_000,
            confirm_poll_interval_ms: 500,
        }
    }
}

impl LedgerConfig {
    /// Resolve the configured commitment string. Unknown values fall back
    /// to "confirmed"; validation rejects them before this is reached.
    pub fn commitment_config(&self) -> CommitmentConfig {
        match self.commitment.as_str() {
            "processed" => CommitmentConfig::processed(),
            "finalized" => CommitmentConfig::finalized(),
            _ => CommitmentConfig::confirmed(),
        }
    }
}

/// Payment shaping configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PaymentConfig {
    /// Optional compute-unit price in micro-lamports. When set, a
    /// compute-budget instruction is prepended to every transfer.
    pub priority_fee_micro_lamports: Option<u64>,
}
