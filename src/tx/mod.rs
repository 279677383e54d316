//! Transaction assembly and submission subsystem.
//!
//! # Data Flow
//! ```text
//! PaymentIntent (from server quote, amount converted once)
//!     + NetworkReference (fetched fresh by the caller)
//!     → builder.rs (pure assembly, fixed instruction order)
//!     → submitter.rs (sign via session, race confirmation vs timeout)
//! ```

pub mod builder;
pub mod intent;
pub mod submitter;

pub use builder::build_transfer;
pub use intent::{sol_to_lamports, IntentError, PaymentIntent};
pub use submitter::TransactionSubmitter;
