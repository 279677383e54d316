//! Payment intents and amount conversion.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::purchase::backend::PaymentQuote;

/// Problems constructing a payment intent from a server quote.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("invalid SOL amount '{0}'")]
    InvalidAmount(String),

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount overflows the lamport range")]
    AmountOverflow,

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("quote payer {quoted} does not match connected wallet {connected}")]
    PayerMismatch { quoted: Pubkey, connected: Pubkey },
}

/// A concrete payment the buyer is asked to sign. Amounts are lamports;
/// the decimal SOL price is converted exactly once, here, and never
/// recomputed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Payer; must equal the connected session address at submission time.
    pub from: Pubkey,
    /// Payee, decided by the server.
    pub to: Pubkey,
    /// Transfer amount in lamports, always positive.
    pub lamports: u64,
    /// Optional compute-unit price in micro-lamports, prepended as a
    /// compute-budget instruction when present.
    pub priority_fee: Option<u64>,
}

impl PaymentIntent {
    /// Build an intent directly from known parts.
    pub fn new(
        from: Pubkey,
        to: Pubkey,
        lamports: u64,
        priority_fee: Option<u64>,
    ) -> Result<Self, IntentError> {
        if lamports == 0 {
            return Err(IntentError::ZeroAmount);
        }
        Ok(Self {
            from,
            to,
            lamports,
            priority_fee,
        })
    }

    /// Build an intent from a server-issued quote. The server decides the
    /// price and payee; this only parses addresses, converts the decimal
    /// amount, and verifies the quote was issued for the connected buyer.
    pub fn from_quote(
        quote: &PaymentQuote,
        buyer: Pubkey,
        priority_fee: Option<u64>,
    ) -> Result<Self, IntentError> {
        let from: Pubkey = quote
            .from_pubkey
            .parse()
            .map_err(|_| IntentError::InvalidAddress(quote.from_pubkey.clone()))?;
        let to: Pubkey = quote
            .to_pubkey
            .parse()
            .map_err(|_| IntentError::InvalidAddress(quote.to_pubkey.clone()))?;

        if from != buyer {
            return Err(IntentError::PayerMismatch {
                quoted: from,
                connected: buyer,
            });
        }

        let lamports = sol_to_lamports(&quote.amount_sol)?;
        Self::new(from, to, lamports, priority_fee)
    }
}

/// Convert a decimal SOL string to lamports exactly, without going through
/// floating point. Accepts up to nine fractional digits.
pub fn sol_to_lamports(amount: &str) -> Result<u64, IntentError> {
    let invalid = || IntentError::InvalidAmount(amount.to_string());

    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > 9 {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| IntentError::AmountOverflow)?
    };

    let frac_lamports: u64 = if frac.is_empty() {
        0
    } else {
        // right-pad to nine digits: "5" → 500_000_000
        let padded = format!("{frac:0<9}");
        padded.parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|w| w.checked_add(frac_lamports))
        .ok_or(IntentError::AmountOverflow)
}
