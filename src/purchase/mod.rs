//! Purchase orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! PurchaseEngine::begin(listing)
//!     → backend.rs  initiate → PaymentQuote → PaymentIntent
//!     → machine.rs  sign: fresh blockhash → build → sign → confirm watch
//!     → backend.rs  confirm → PurchaseRecord (terminal)
//! ```
//!
//! # Invariants
//! - The backend confirm call runs exactly once per successful signature,
//!   only after on-chain confirmation
//! - Cancellation is only honored at `initiated`, before a signature exists
//! - One active flow per (listing, buyer) pair

pub mod backend;
pub mod flow;
pub mod machine;

pub use backend::{BackendError, HttpBackend, Listing, PaymentQuote, PurchaseBackend, PurchaseRecord};
pub use flow::{FlowError, FlowEvent, Step, SubmittedTransaction, TxStatus};
pub use machine::{PurchaseEngine, PurchaseFlow};
