//! Shared mocks for integration tests: a scriptable wallet provider, a
//! scriptable ledger, and a recording purchase backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use photopay_client::ledger::{LedgerResult, NetworkReference};
use photopay_client::purchase::backend::{
    BackendError, Listing, PaymentQuote, PurchaseRecord,
};
use photopay_client::wallet::provider::ProviderError;
use photopay_client::{ClientConfig, LedgerRpc, PurchaseBackend, WalletProvider};

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Config with short confirmation deadlines so timeout scenarios run fast.
pub fn fast_config() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.ledger.confirm_timeout_ms = 200;
    config.ledger.confirm_poll_interval_ms = 5;
    config
}

/// Wallet provider that replays a script of sign outcomes.
pub struct MockProvider {
    pub address: Pubkey,
    sign_script: Mutex<VecDeque<Result<Signature, ProviderError>>>,
    pub sign_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            sign_script: Mutex::new(VecDeque::new()),
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn push_sign(&self, outcome: Result<Signature, ProviderError>) {
        self.sign_script.lock().push_back(outcome);
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn connect(&self, _only_if_trusted: bool) -> Result<Pubkey, ProviderError> {
        Ok(self.address)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn sign_and_submit(
        &self,
        _transaction: Transaction,
    ) -> Result<Signature, ProviderError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_script
            .lock()
            .pop_front()
            .unwrap_or(Ok(Signature::default()))
    }
}

/// Ledger that mints a distinct blockhash per fetch and replays a script
/// of signature-status probes (the final entry repeats).
pub struct MockLedger {
    pub blockhash_calls: AtomicUsize,
    status_script: Mutex<VecDeque<Option<Result<(), String>>>>,
    pub height: u64,
    pub last_valid_height: u64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            blockhash_calls: AtomicUsize::new(0),
            status_script: Mutex::new(VecDeque::new()),
            height: 50,
            last_valid_height: 100,
        }
    }

    pub fn push_status(&self, status: Option<Result<(), String>>) {
        self.status_script.lock().push_back(status);
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> LedgerResult<NetworkReference> {
        self.blockhash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(NetworkReference {
            blockhash: Hash::new_unique(),
            last_valid_block_height: self.last_valid_height,
        })
    }

    async fn signature_status(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> LedgerResult<Option<Result<(), String>>> {
        let mut script = self.status_script.lock();
        if script.len() > 1 {
            Ok(script.pop_front().unwrap_or(None))
        } else {
            Ok(script.front().cloned().unwrap_or(None))
        }
    }

    async fn block_height(&self, _commitment: CommitmentConfig) -> LedgerResult<u64> {
        Ok(self.height)
    }
}

/// Backend that serves one listing and records every call it receives.
pub struct MockBackend {
    pub creator: Pubkey,
    pub price_sol: String,
    pub initiate_calls: AtomicUsize,
    pub confirm_calls: Mutex<Vec<(String, String, String)>>,
    pub fail_initiate: bool,
    /// When > 0, that many confirm calls fail before one succeeds.
    pub confirm_failures: AtomicUsize,
}

impl MockBackend {
    pub fn new(price_sol: &str) -> Self {
        Self {
            creator: Pubkey::new_unique(),
            price_sol: price_sol.to_string(),
            initiate_calls: AtomicUsize::new(0),
            confirm_calls: Mutex::new(Vec::new()),
            fail_initiate: false,
            confirm_failures: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PurchaseBackend for MockBackend {
    async fn initiate_purchase(
        &self,
        _listing_id: &str,
        buyer: &Pubkey,
    ) -> Result<PaymentQuote, BackendError> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_initiate {
            return Err(BackendError::Status {
                code: 503,
                detail: "backend down".into(),
            });
        }
        Ok(PaymentQuote {
            from_pubkey: buyer.to_string(),
            to_pubkey: self.creator.to_string(),
            amount_sol: self.price_sol.clone(),
        })
    }

    async fn confirm_purchase(
        &self,
        listing_id: &str,
        buyer: &Pubkey,
        signature: &Signature,
    ) -> Result<PurchaseRecord, BackendError> {
        if self
            .confirm_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(BackendError::Http("connection reset".into()));
        }
        self.confirm_calls.lock().push((
            listing_id.to_string(),
            buyer.to_string(),
            signature.to_string(),
        ));
        Ok(PurchaseRecord {
            listing_id: listing_id.to_string(),
            buyer_wallet: buyer.to_string(),
            transaction_signature: signature.to_string(),
            purchased_at: None,
        })
    }

    async fn get_listing(&self, id: &str) -> Result<Listing, BackendError> {
        Ok(Listing {
            id: id.to_string(),
            title: "Test Artwork".into(),
            description: None,
            price_sol: self.price_sol.clone(),
            creator_wallet: self.creator.to_string(),
            preview_url: None,
            created_at: None,
        })
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, BackendError> {
        Ok(vec![self.get_listing("1").await?])
    }
}

/// A connected session plus engine over the given mocks.
#[allow(dead_code)]
pub async fn engine_with(
    provider: Arc<MockProvider>,
    ledger: Arc<MockLedger>,
    backend: Arc<MockBackend>,
    config: &ClientConfig,
) -> (Arc<photopay_client::WalletSession>, photopay_client::PurchaseEngine) {
    let session = Arc::new(photopay_client::WalletSession::new(Some(
        provider as Arc<dyn WalletProvider>,
    )));
    session.connect(false).await.unwrap();
    let engine = photopay_client::PurchaseEngine::new(
        Arc::clone(&session),
        backend as Arc<dyn PurchaseBackend>,
        ledger as Arc<dyn LedgerRpc>,
        config,
    );
    (session, engine)
}
