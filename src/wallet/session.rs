//! Wallet session lifecycle.
//!
//! # Responsibilities
//! - Own the connection state (address) for the whole application session
//! - Connect (interactive or silent), disconnect, sign-and-submit
//! - Emit connect/disconnect events for observers (toast layer)
//!
//! # Design Decisions
//! - The session is the only component that mutates the address; every
//!   other component reads it through accessors
//! - Disconnect always clears local state even if the provider call fails;
//!   local state is the source of truth for the UI
//! - Events go over a broadcast channel so emission never blocks the flow

use std::sync::Arc;

use parking_lot::RwLock;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tokio::sync::broadcast;

use crate::error::PurchaseError;
use crate::wallet::provider::WalletProvider;

/// Notifications emitted on session lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected(Pubkey),
    Disconnected,
}

/// Connection session to an external signing provider.
pub struct WalletSession {
    /// The injected provider capability; `None` means no signer detected.
    provider: Option<Arc<dyn WalletProvider>>,
    /// Connected address, absent until a connect succeeds.
    address: RwLock<Option<Pubkey>>,
    /// Lifecycle event channel for observers.
    events: broadcast::Sender<SessionEvent>,
}

impl WalletSession {
    /// Create a session over a detected provider, or over none when the
    /// capability probe found no signer.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            provider,
            address: RwLock::new(None),
            events,
        }
    }

    /// The connected address, if any.
    pub fn address(&self) -> Option<Pubkey> {
        *self.address.read()
    }

    /// Whether a connect has succeeded and not been cleared.
    pub fn is_connected(&self) -> bool {
        self.address.read().is_some()
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Connect to the provider. In silent mode the provider only succeeds
    /// if this origin is already trusted and never prompts; callers treat
    /// a silent failure as "not connected" rather than surfacing it.
    pub async fn connect(&self, silent: bool) -> Result<Pubkey, PurchaseError> {
        let provider = match &self.provider {
            Some(provider) => Arc::clone(provider),
            None => {
                if !silent {
                    tracing::warn!("connect requested but no wallet provider detected");
                }
                return Err(PurchaseError::ProviderMissing);
            }
        };

        match provider.connect(silent).await {
            Ok(address) => {
                *self.address.write() = Some(address);
                let _ = self.events.send(SessionEvent::Connected(address));
                tracing::info!(address = %shorten(&address), silent, "wallet connected");
                Ok(address)
            }
            Err(err) => {
                if silent {
                    tracing::debug!(error = %err, "silent reconnect declined");
                } else {
                    tracing::warn!(error = %err, "wallet connect failed");
                }
                Err(err.into())
            }
        }
    }

    /// Disconnect from the provider. The provider call is best-effort;
    /// local state is always cleared.
    pub async fn disconnect(&self) {
        if let Some(provider) = &self.provider {
            if let Err(err) = provider.disconnect().await {
                tracing::warn!(error = %err, "provider disconnect failed, clearing local state anyway");
            }
        }

        *self.address.write() = None;
        let _ = self.events.send(SessionEvent::Disconnected);
        tracing::info!("wallet disconnected");
    }

    /// Sign and broadcast a transaction through the provider as one atomic
    /// request. Does not wait for chain confirmation.
    pub async fn sign_and_submit(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, PurchaseError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(PurchaseError::ProviderMissing)?;

        if !self.is_connected() {
            return Err(PurchaseError::Unclassified("wallet not connected".into()));
        }

        let signature = provider.sign_and_submit(transaction).await?;
        tracing::debug!(%signature, "transaction signed and broadcast");
        Ok(signature)
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("has_provider", &self.provider.is_some())
            .field("address", &self.address())
            .finish()
    }
}

/// Truncated address for logs (`4fXk...9mQa`).
fn shorten(address: &Pubkey) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..4], &full[full.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        address: Pubkey,
        trusted: bool,
        reject_connect: bool,
        fail_disconnect: bool,
        connect_calls: AtomicUsize,
    }

    impl StubProvider {
        fn new() -> Self {
            Self {
                address: Pubkey::new_unique(),
                trusted: false,
                reject_connect: false,
                fail_disconnect: false,
                connect_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for StubProvider {
        async fn connect(&self, only_if_trusted: bool) -> Result<Pubkey, ProviderError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            if only_if_trusted && !self.trusted {
                return Err(ProviderError::Unavailable);
            }
            if self.reject_connect {
                return Err(ProviderError::Rejected);
            }
            Ok(self.address)
        }

        async fn disconnect(&self) -> Result<(), ProviderError> {
            if self.fail_disconnect {
                return Err(ProviderError::Other("provider hiccup".into()));
            }
            Ok(())
        }

        async fn sign_and_submit(
            &self,
            _transaction: Transaction,
        ) -> Result<Signature, ProviderError> {
            Ok(Signature::default())
        }
    }

    #[tokio::test]
    async fn test_connect_sets_address_and_emits_event() {
        let provider = Arc::new(StubProvider::new());
        let session = WalletSession::new(Some(provider.clone()));
        let mut events = session.subscribe();

        let address = session.connect(false).await.unwrap();
        assert_eq!(address, provider.address);
        assert!(session.is_connected());
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::Connected(address)
        );
    }

    #[tokio::test]
    async fn test_missing_provider_is_classified() {
        let session = WalletSession::new(None);
        let err = session.connect(false).await.unwrap_err();
        assert_eq!(err, PurchaseError::ProviderMissing);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_silent_connect_fails_when_not_trusted() {
        let session = WalletSession::new(Some(Arc::new(StubProvider::new())));
        assert!(session.connect(true).await.is_err());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_silent_connect_succeeds_when_trusted() {
        let mut provider = StubProvider::new();
        provider.trusted = true;
        let session = WalletSession::new(Some(Arc::new(provider)));
        assert!(session.connect(true).await.is_ok());
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_user_rejection_is_classified() {
        let mut provider = StubProvider::new();
        provider.reject_connect = true;
        let session = WalletSession::new(Some(Arc::new(provider)));
        let err = session.connect(false).await.unwrap_err();
        assert_eq!(err, PurchaseError::UserRejected);
    }

    #[tokio::test]
    async fn test_disconnect_clears_state_even_on_provider_failure() {
        let mut provider = StubProvider::new();
        provider.fail_disconnect = true;
        let session = WalletSession::new(Some(Arc::new(provider)));

        session.connect(false).await.unwrap();
        let mut events = session.subscribe();
        session.disconnect().await;

        assert!(!session.is_connected());
        assert_eq!(session.address(), None);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Disconnected);
    }

    #[tokio::test]
    async fn test_sign_requires_connection() {
        let session = WalletSession::new(Some(Arc::new(StubProvider::new())));
        let tx = Transaction::default();
        let err = session.sign_and_submit(tx).await.unwrap_err();
        assert!(matches!(err, PurchaseError::Unclassified(_)));
    }
}
