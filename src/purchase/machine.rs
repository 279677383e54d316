//! Purchase orchestration state machine.
//!
//! # Responsibilities
//! - Sequence backend initiate → build → sign → confirm → backend confirm
//! - Enforce the state machine's legal transitions, retry edge, and cancel
//!   edge
//! - Enforce one active flow per (listing, buyer) pair
//!
//! # Design Decisions
//! - The engine receives the wallet session, backend, and ledger as
//!   explicit dependencies; nothing is discovered ambiently
//! - Re-entering `initiated` after a failure discards the attempt's
//!   network reference; the next attempt fetches a fresh one
//! - The backend confirm call happens only after on-chain confirmation,
//!   and at most once per successful signature

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::error::PurchaseError;
use crate::ledger::LedgerRpc;
use crate::purchase::backend::{PurchaseBackend, PurchaseRecord};
use crate::purchase::flow::{FlowError, FlowEvent, Step, SubmittedTransaction, TxStatus};
use crate::tx::builder::build_transfer;
use crate::tx::intent::PaymentIntent;
use crate::tx::submitter::TransactionSubmitter;
use crate::wallet::WalletSession;

type FlowKey = (String, Pubkey);

/// Entry point for purchases. Owns the active-flow registry and hands out
/// one [`PurchaseFlow`] per accepted purchase request.
pub struct PurchaseEngine {
    session: Arc<WalletSession>,
    backend: Arc<dyn PurchaseBackend>,
    ledger: Arc<dyn LedgerRpc>,
    submitter: TransactionSubmitter,
    commitment: CommitmentConfig,
    priority_fee: Option<u64>,
    active: Arc<DashMap<FlowKey, ()>>,
}

impl PurchaseEngine {
    pub fn new(
        session: Arc<WalletSession>,
        backend: Arc<dyn PurchaseBackend>,
        ledger: Arc<dyn LedgerRpc>,
        config: &ClientConfig,
    ) -> Self {
        let submitter =
            TransactionSubmitter::new(Arc::clone(&session), Arc::clone(&ledger), &config.ledger);
        Self {
            session,
            backend,
            ledger,
            submitter,
            commitment: config.ledger.commitment_config(),
            priority_fee: config.payment.priority_fee_micro_lamports,
            active: Arc::new(DashMap::new()),
        }
    }

    /// Start a purchase: register the (listing, buyer) pair, ask the
    /// backend to price it, and hold the resulting intent at the
    /// `initiated` step. On failure the registration is released and the
    /// flow never existed (back to idle).
    pub async fn begin(&self, listing_id: &str) -> Result<PurchaseFlow, FlowError> {
        let buyer = self.session.address().ok_or(FlowError::NotConnected)?;
        let key: FlowKey = (listing_id.to_string(), buyer);

        match self.active.entry(key.clone()) {
            Entry::Occupied(_) => {
                tracing::warn!(listing_id, "purchase already in progress, rejecting");
                return Err(FlowError::AlreadyActive(listing_id.to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        let guard = ActiveGuard::new(Arc::clone(&self.active), key);

        tracing::info!(listing_id, buyer = %buyer, "purchase initiating");
        let quote = self
            .backend
            .initiate_purchase(listing_id, &buyer)
            .await
            .map_err(PurchaseError::from)?;

        let intent = PaymentIntent::from_quote(&quote, buyer, self.priority_fee)
            .map_err(PurchaseError::from)?;

        let (events, _) = broadcast::channel(32);
        tracing::info!(
            listing_id,
            lamports = intent.lamports,
            "purchase initiated, awaiting sign request"
        );

        Ok(PurchaseFlow {
            listing_id: listing_id.to_string(),
            buyer,
            step: Step::Initiated,
            intent,
            last_error: None,
            submitted: None,
            record: None,
            session: Arc::clone(&self.session),
            backend: Arc::clone(&self.backend),
            ledger: Arc::clone(&self.ledger),
            submitter: self.submitter.clone(),
            commitment: self.commitment,
            events,
            guard,
        })
    }
}

impl std::fmt::Debug for PurchaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseEngine")
            .field("active_flows", &self.active.len())
            .finish()
    }
}

/// One purchase in flight, from `initiated` to a terminal outcome.
pub struct PurchaseFlow {
    listing_id: String,
    buyer: Pubkey,
    step: Step,
    intent: PaymentIntent,
    last_error: Option<PurchaseError>,
    submitted: Option<SubmittedTransaction>,
    record: Option<PurchaseRecord>,
    session: Arc<WalletSession>,
    backend: Arc<dyn PurchaseBackend>,
    ledger: Arc<dyn LedgerRpc>,
    submitter: TransactionSubmitter,
    commitment: CommitmentConfig,
    events: broadcast::Sender<FlowEvent>,
    guard: ActiveGuard,
}

impl PurchaseFlow {
    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn buyer(&self) -> Pubkey {
        self.buyer
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    /// The last classified failure, kept across the retry edge.
    pub fn last_error(&self) -> Option<&PurchaseError> {
        self.last_error.as_ref()
    }

    /// The most recent broadcast attempt, with its settlement status.
    pub fn submitted(&self) -> Option<&SubmittedTransaction> {
        self.submitted.as_ref()
    }

    /// The recorded sale, once the backend confirm call has succeeded.
    pub fn record(&self) -> Option<&PurchaseRecord> {
        self.record.as_ref()
    }

    /// Subscribe to step changes and failures.
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    /// Drive the flow from `initiated` to `success`: fetch a fresh
    /// blockhash, build, sign, watch confirmation, then record the sale.
    /// A classified failure returns the flow to `initiated` for retry.
    pub async fn sign(&mut self) -> Result<PurchaseRecord, FlowError> {
        if self.step != Step::Initiated {
            return Err(FlowError::WrongStep { step: self.step });
        }
        // The payer was fixed at initiation; a session change invalidates it.
        if self.session.address() != Some(self.intent.from) {
            return Err(FlowError::WalletChanged);
        }

        self.enter(Step::Signing);
        match self.attempt().await {
            Ok(signature) => {
                if let Some(submitted) = &mut self.submitted {
                    submitted.status = TxStatus::Confirmed;
                }
                self.last_error = None;
                self.enter(Step::Success);
                self.confirm_with_backend(signature).await
            }
            Err(err) => {
                self.note_attempt_outcome(&err);
                self.last_error = Some(err.clone());
                let _ = self.events.send(FlowEvent::Failed(err.clone()));
                tracing::warn!(
                    listing_id = %self.listing_id,
                    error = %err,
                    "purchase attempt failed, returning to initiated"
                );
                self.enter(Step::Initiated);
                Err(err.into())
            }
        }
    }

    /// Abandon the flow. Only legal before any signature can exist; once
    /// signing has begun the transaction may already be broadcast.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        if self.step != Step::Initiated {
            return Err(FlowError::WrongStep { step: self.step });
        }
        self.enter(Step::Idle);
        self.guard.release();
        tracing::info!(listing_id = %self.listing_id, "purchase cancelled");
        Ok(())
    }

    /// Re-issue the backend confirm call after it failed post-confirmation.
    /// Safe because the backend is idempotent on the signature; returns the
    /// existing record if one was already obtained.
    pub async fn retry_confirm(&mut self) -> Result<PurchaseRecord, FlowError> {
        if self.step != Step::Success {
            return Err(FlowError::WrongStep { step: self.step });
        }
        if let Some(record) = &self.record {
            return Ok(record.clone());
        }
        let signature = self
            .submitted
            .as_ref()
            .map(|submitted| submitted.signature)
            .ok_or(FlowError::WrongStep { step: self.step })?;
        self.confirm_with_backend(signature).await
    }

    /// One transaction attempt. The network reference is fetched here,
    /// immediately before the build, and is never reused by a later
    /// attempt.
    async fn attempt(&mut self) -> Result<Signature, PurchaseError> {
        let reference = self.ledger.latest_blockhash(self.commitment).await?;
        let unsigned = build_transfer(&self.intent, &reference);

        let signature = self.session.sign_and_submit(unsigned).await?;
        self.submitted = Some(SubmittedTransaction {
            signature,
            status: TxStatus::Pending,
        });
        self.enter(Step::Confirming);

        self.submitter
            .await_confirmation(&signature, &reference)
            .await?;
        Ok(signature)
    }

    async fn confirm_with_backend(
        &mut self,
        signature: Signature,
    ) -> Result<PurchaseRecord, FlowError> {
        match self
            .backend
            .confirm_purchase(&self.listing_id, &self.buyer, &signature)
            .await
        {
            Ok(record) => {
                self.record = Some(record.clone());
                self.guard.release();
                tracing::info!(
                    listing_id = %self.listing_id,
                    %signature,
                    "purchase recorded"
                );
                Ok(record)
            }
            Err(err) => {
                // The payment has settled; keep the signature and stay in
                // `success` so the idempotent confirm can be retried.
                let err = PurchaseError::from(err);
                self.last_error = Some(err.clone());
                let _ = self.events.send(FlowEvent::Failed(err.clone()));
                tracing::error!(
                    listing_id = %self.listing_id,
                    %signature,
                    error = %err,
                    "sale confirmed on chain but backend record failed"
                );
                Err(err.into())
            }
        }
    }

    /// Update the submitted attempt's status for failures that happened
    /// after a signature existed. Sign-step failures leave no attempt.
    fn note_attempt_outcome(&mut self, err: &PurchaseError) {
        let Some(submitted) = &mut self.submitted else {
            return;
        };
        match err {
            PurchaseError::ConfirmationTimeout { signature } if *signature == submitted.signature => {
                submitted.status = TxStatus::TimedOut;
            }
            PurchaseError::OnChainFailure { signature, reason }
                if *signature == submitted.signature =>
            {
                submitted.status = TxStatus::Failed(reason.clone());
            }
            PurchaseError::BlockhashExpired => {
                submitted.status = TxStatus::Expired;
            }
            _ => {}
        }
    }

    fn enter(&mut self, step: Step) {
        self.step = step;
        let _ = self.events.send(FlowEvent::Step(step));
        tracing::debug!(listing_id = %self.listing_id, ?step, "purchase step");
    }
}

impl std::fmt::Debug for PurchaseFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseFlow")
            .field("listing_id", &self.listing_id)
            .field("buyer", &self.buyer)
            .field("step", &self.step)
            .field("submitted", &self.submitted)
            .finish()
    }
}

/// Registry slot for an active flow; removed on release or drop so an
/// abandoned flow never blocks the next purchase of the same listing.
struct ActiveGuard {
    active: Arc<DashMap<FlowKey, ()>>,
    key: FlowKey,
    released: bool,
}

impl ActiveGuard {
    fn new(active: Arc<DashMap<FlowKey, ()>>, key: FlowKey) -> Self {
        Self {
            active,
            key,
            released: false,
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.active.remove(&self.key);
            self.released = true;
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.release();
    }
}
