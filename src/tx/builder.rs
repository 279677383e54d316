//! Unsigned transfer assembly.
//!
//! # Responsibilities
//! - Turn a payment intent and a fresh network reference into an unsigned
//!   transaction, ready for the provider to sign
//!
//! # Design Decisions
//! - Pure function, no I/O: the caller fetches the blockhash so the
//!   expiry-sensitive fetch stays explicit and retry-aware
//! - Instruction order is fixed: compute-budget priority fee (if any)
//!   first, then the transfer; the runtime requires the fee directive to
//!   precede the instructions it prices

use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;

use crate::ledger::NetworkReference;
use crate::tx::intent::PaymentIntent;

/// Assemble an unsigned SOL transfer for the given intent, anchored to the
/// given network reference. Deterministic for identical inputs.
pub fn build_transfer(intent: &PaymentIntent, reference: &NetworkReference) -> Transaction {
    let mut instructions: Vec<Instruction> = Vec::with_capacity(2);

    if let Some(micro_lamports) = intent.priority_fee {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_price(
            micro_lamports,
        ));
    }

    instructions.push(system_instruction::transfer(
        &intent.from,
        &intent.to,
        intent.lamports,
    ));

    let mut transaction = Transaction::new_with_payer(&instructions, Some(&intent.from));
    transaction.message.recent_blockhash = reference.blockhash;
    transaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::pubkey::Pubkey;

    fn test_reference() -> NetworkReference {
        NetworkReference {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1_000,
        }
    }

    fn test_intent(priority_fee: Option<u64>) -> PaymentIntent {
        PaymentIntent::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            1_000_000_000,
            priority_fee,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_transfer_shape() {
        let intent = test_intent(None);
        let reference = test_reference();
        let tx = build_transfer(&intent, &reference);

        let message = &tx.message;
        assert_eq!(message.instructions.len(), 1);
        assert_eq!(
            message.instructions[0].program_id(&message.account_keys),
            &solana_sdk::system_program::id()
        );
        // fee payer is the intent's payer
        assert_eq!(message.account_keys[0], intent.from);
        assert_eq!(message.recent_blockhash, reference.blockhash);
    }

    #[test]
    fn test_priority_fee_precedes_transfer() {
        let intent = test_intent(Some(5_000));
        let reference = test_reference();
        let tx = build_transfer(&intent, &reference);

        let message = &tx.message;
        assert_eq!(message.instructions.len(), 2);
        assert_eq!(
            message.instructions[0].program_id(&message.account_keys),
            &solana_sdk::compute_budget::id()
        );
        assert_eq!(
            message.instructions[1].program_id(&message.account_keys),
            &solana_sdk::system_program::id()
        );
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let intent = test_intent(Some(5_000));
        let reference = test_reference();

        let a = build_transfer(&intent, &reference);
        let b = build_transfer(&intent, &reference);
        assert_eq!(a.message_data(), b.message_data());
    }
}
