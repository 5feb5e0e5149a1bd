use proptest::prelude::*;

use bsv_script::Script;
use bsv_transaction::{Transaction, TransactionInput, TransactionOutput};

/// Strategy to generate a random decodable transaction.
fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 1..64),
        any::<u32>(),
    )
        .prop_map(|(txid, vout, script_bytes, seq)| TransactionInput {
            source_txid: txid,
            source_tx_out_index: vout,
            sequence_number: seq,
            unlocking_script: Some(Script::from_bytes(&script_bytes)),
            spent_output: None,
        });

    let arb_output = (any::<u64>(), prop::collection::vec(any::<u8>(), 0..64)).prop_map(
        |(satoshis, script_bytes)| TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(&script_bytes),
            change: false,
        },
    );

    (
        any::<u32>(),
        prop::collection::vec(arb_input, 1..4),
        prop::collection::vec(arb_output, 1..4),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decode_reproduces_transaction(tx in arb_transaction()) {
        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        prop_assert_eq!(&decoded, &tx);
        prop_assert_eq!(decoded.tx_id(), tx.tx_id());
    }

    #[test]
    fn flipping_any_byte_changes_txid(tx in arb_transaction(), pos in any::<prop::sample::Index>(), bit in 0u8..8) {
        let mut bytes = tx.to_bytes();
        let i = pos.index(bytes.len());
        bytes[i] ^= 1 << bit;
        if let Ok(mutated) = Transaction::from_bytes(&bytes) {
            prop_assert_ne!(mutated.tx_id(), tx.tx_id());
        }
    }
}
