//! Transaction submission and confirmation watching.
//!
//! # Responsibilities
//! - Hand an unsigned transaction to the wallet session for signing and
//!   broadcast
//! - Race the on-chain confirmation watch against a timeout
//! - Detect blockhash expiry via the reference's last-valid block height
//!
//! # Design Decisions
//! - No automatic retry here: a retry means a brand-new transaction with a
//!   brand-new blockhash, which is the state machine's responsibility
//! - Transient RPC errors inside the watch are logged and tolerated; the
//!   outer timeout bounds them, so a signature is never silently lost

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tokio::time::{interval, timeout};

use crate::config::LedgerConfig;
use crate::error::PurchaseError;
use crate::ledger::{LedgerRpc, NetworkReference};
use crate::wallet::WalletSession;

/// Signs, broadcasts, and watches a single transaction attempt.
#[derive(Clone)]
pub struct TransactionSubmitter {
    session: Arc<WalletSession>,
    ledger: Arc<dyn LedgerRpc>,
    commitment: CommitmentConfig,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

impl TransactionSubmitter {
    pub fn new(
        session: Arc<WalletSession>,
        ledger: Arc<dyn LedgerRpc>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            session,
            ledger,
            commitment: config.commitment_config(),
            confirm_timeout: Duration::from_millis(config.confirm_timeout_ms),
            poll_interval: Duration::from_millis(config.confirm_poll_interval_ms),
        }
    }

    /// Sign, broadcast, and wait for confirmation. Signing failures
    /// propagate classified; once a signature exists, every failure path
    /// carries it.
    pub async fn submit(
        &self,
        unsigned: Transaction,
        reference: &NetworkReference,
    ) -> Result<Signature, PurchaseError> {
        let signature = self.session.sign_and_submit(unsigned).await?;
        self.await_confirmation(&signature, reference).await?;
        Ok(signature)
    }

    /// Race the confirmation watch against the configured timeout. The
    /// loser's eventual result is discarded; only the first settles.
    pub async fn await_confirmation(
        &self,
        signature: &Signature,
        reference: &NetworkReference,
    ) -> Result<(), PurchaseError> {
        match timeout(self.confirm_timeout, self.watch(signature, reference)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    %signature,
                    timeout_ms = self.confirm_timeout.as_millis() as u64,
                    "confirmation watch timed out"
                );
                Err(PurchaseError::ConfirmationTimeout {
                    signature: *signature,
                })
            }
        }
    }

    async fn watch(
        &self,
        signature: &Signature,
        reference: &NetworkReference,
    ) -> Result<(), PurchaseError> {
        let mut ticker = interval(self.poll_interval);

        loop {
            ticker.tick().await;

            match self.ledger.signature_status(signature, self.commitment).await {
                Ok(Some(Ok(()))) => {
                    tracing::debug!(%signature, "transaction confirmed");
                    return Ok(());
                }
                Ok(Some(Err(reason))) => {
                    tracing::warn!(%signature, %reason, "transaction failed on chain");
                    return Err(PurchaseError::OnChainFailure {
                        signature: *signature,
                        reason,
                    });
                }
                Ok(None) => {
                    // Not settled yet; check whether the blockhash can
                    // still be included.
                    match self.ledger.block_height(self.commitment).await {
                        Ok(height) if height > reference.last_valid_block_height => {
                            tracing::warn!(
                                %signature,
                                height,
                                last_valid = reference.last_valid_block_height,
                                "blockhash expired before confirmation"
                            );
                            return Err(PurchaseError::BlockhashExpired);
                        }
                        Ok(_) => {
                            tracing::debug!(%signature, "transaction pending");
                        }
                        Err(e) => {
                            tracing::warn!(%signature, error = %e, "block height poll failed");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(%signature, error = %e, "signature status poll failed");
                }
            }
        }
    }
}
