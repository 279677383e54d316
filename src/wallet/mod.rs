//! Wallet integration subsystem.
//!
//! # Data Flow
//! ```text
//! injected WalletProvider capability (Phantom-style signer)
//!     → provider.rs (capability trait, raw failure signals)
//!     → session.rs (connection lifecycle, sign-and-submit, events)
//! ```
//!
//! # Constraints
//! - The session owns the address; nothing else mutates it
//! - Provider absence classifies as ProviderMissing, never panics
//! - No private keys anywhere in this crate; signing stays at the provider

pub mod provider;
pub mod session;

pub use provider::{ProviderError, WalletProvider};
pub use session::{SessionEvent, WalletSession};
