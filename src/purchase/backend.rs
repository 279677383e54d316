//! Purchase backend contract and HTTP implementation.
//!
//! # Responsibilities
//! - Define the contract the core needs from the listing/purchase service
//! - Provide the reqwest-based implementation against the REST API
//!
//! # Design Decisions
//! - The core only talks to the `PurchaseBackend` trait; tests inject a
//!   recording mock
//! - The server decides price and payee; the client never computes either

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use crate::config::BackendConfig;

/// Errors from the purchase backend boundary.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {code}: {detail}")]
    Status { code: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// A digital-art listing as the backend publishes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Decimal SOL price as the server quotes it.
    pub price_sol: String,
    pub creator_wallet: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Server-issued payment terms for one purchase. The client converts the
/// decimal amount to lamports exactly once, at intent creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentQuote {
    pub from_pubkey: String,
    pub to_pubkey: String,
    pub amount_sol: String,
}

/// The recorded sale returned by the confirm call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub listing_id: String,
    pub buyer_wallet: String,
    pub transaction_signature: String,
    #[serde(default)]
    pub purchased_at: Option<String>,
}

/// Contract the purchase flow needs from the backend service. The service
/// itself is a collaborator, not part of this crate.
#[async_trait]
pub trait PurchaseBackend: Send + Sync {
    /// Ask the server to price a purchase and name the payee.
    async fn initiate_purchase(
        &self,
        listing_id: &str,
        buyer: &Pubkey,
    ) -> Result<PaymentQuote, BackendError>;

    /// Record a confirmed sale. Idempotent server-side: repeating the call
    /// with the same signature must not create a duplicate record.
    async fn confirm_purchase(
        &self,
        listing_id: &str,
        buyer: &Pubkey,
        signature: &Signature,
    ) -> Result<PurchaseRecord, BackendError>;

    /// Fetch one listing.
    async fn get_listing(&self, id: &str) -> Result<Listing, BackendError>;

    /// Fetch all listings.
    async fn list_listings(&self) -> Result<Vec<Listing>, BackendError>;
}

#[derive(Serialize)]
struct InitiateRequest<'a> {
    listing_id: &'a str,
    buyer_wallet: String,
}

#[derive(Deserialize)]
struct InitiateResponse {
    transaction_data: PaymentQuote,
}

#[derive(Serialize)]
struct ConfirmRequest<'a> {
    listing_id: &'a str,
    buyer_wallet: String,
    transaction_signature: String,
}

/// `PurchaseBackend` over the HTTP API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(BackendError::from)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a success body or surface the backend's error detail.
    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            return Err(BackendError::Status {
                code: status.as_u16(),
                detail,
            });
        }
        response.json::<T>().await.map_err(BackendError::from)
    }
}

#[async_trait]
impl PurchaseBackend for HttpBackend {
    async fn initiate_purchase(
        &self,
        listing_id: &str,
        buyer: &Pubkey,
    ) -> Result<PaymentQuote, BackendError> {
        let response = self
            .client
            .post(self.url("/api/purchase/"))
            .json(&InitiateRequest {
                listing_id,
                buyer_wallet: buyer.to_string(),
            })
            .send()
            .await?;

        let body: InitiateResponse = Self::read(response).await?;
        Ok(body.transaction_data)
    }

    async fn confirm_purchase(
        &self,
        listing_id: &str,
        buyer: &Pubkey,
        signature: &Signature,
    ) -> Result<PurchaseRecord, BackendError> {
        let response = self
            .client
            .post(self.url("/api/purchase/confirm"))
            .json(&ConfirmRequest {
                listing_id,
                buyer_wallet: buyer.to_string(),
                transaction_signature: signature.to_string(),
            })
            .send()
            .await?;

        Self::read(response).await
    }

    async fn get_listing(&self, id: &str) -> Result<Listing, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/listings/{id}")))
            .send()
            .await?;
        Self::read(response).await
    }

    async fn list_listings(&self) -> Result<Vec<Listing>, BackendError> {
        let response = self.client.get(self.url("/api/listings/")).send().await?;
        Self::read(response).await
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_deserializes_from_api_shape() {
        let body = r#"{
            "transaction_data": {
                "from_pubkey": "4Nd1mY5sVgencyhcQ1U9tLyoLyNYBQxU4FAasgEKv9vU",
                "to_pubkey": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
                "amount_sol": "1.5"
            }
        }"#;
        let decoded: InitiateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.transaction_data.amount_sol, "1.5");
    }

    #[test]
    fn test_listing_tolerates_missing_optionals() {
        let body = r#"{
            "id": "42",
            "title": "Dunes at Dusk",
            "price_sol": "0.8",
            "creator_wallet": "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"
        }"#;
        let listing: Listing = serde_json::from_str(body).unwrap();
        assert_eq!(listing.title, "Dunes at Dusk");
        assert!(listing.description.is_none());
        assert!(listing.preview_url.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let backend = HttpBackend::new(&BackendConfig {
            base_url: "http://localhost:8000/".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(backend.url("/api/listings/"), "http://localhost:8000/api/listings/");
    }
}
