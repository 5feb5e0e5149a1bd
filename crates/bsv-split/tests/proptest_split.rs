use proptest::prelude::*;

use bsv_primitives::ec::PrivateKey;
use bsv_script::{Address, Network, Script};
use bsv_split::fee::estimate_fee;
use bsv_split::validator::{utxo_from_source, validate_utxo};
use bsv_split::{Recipient, SplitBuilder, SplitConfig, SplitError, Utxo};
use bsv_transaction::{Transaction, TransactionInput, TransactionOutput};

const KEY_HEX: &str = "00000000000000000000000000000000000000000000000000000000000abcde";

fn source() -> Address {
    let key = PrivateKey::from_hex(KEY_HEX).unwrap();
    Address::from_public_key(&key.pub_key(), Network::Mainnet)
}

fn funding(amounts: &[u64], seed: u8) -> Transaction {
    let to = source();
    let mut tx = Transaction::new();
    let mut input = TransactionInput::spending([seed; 32], 0, TransactionOutput::pay_to(&to, 1));
    input.unlocking_script = Some(Script::from_bytes(&[0x51]));
    tx.add_input(input);
    for &amount in amounts {
        tx.add_output(TransactionOutput::pay_to(&to, amount));
    }
    tx
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn conservation_holds(
        amounts in prop::collection::vec(1_000u64..200_000, 1..4),
        output_count in 1u32..8,
        per_output in 1u64..2_000,
        rate_cents in 0u32..300,
        seed in any::<u8>(),
    ) {
        let fee_rate = rate_cents as f64 / 100.0;
        let fund = funding(&amounts, seed);
        let utxos: Vec<Utxo> = (0..amounts.len() as u32)
            .map(|vout| utxo_from_source(&fund.to_bytes(), vout).unwrap())
            .collect();
        let total: u64 = amounts.iter().sum();
        let need = output_count as u64 * per_output
            + estimate_fee(utxos.len(), output_count as usize + 1, fee_rate);

        let cfg = SplitConfig {
            output_count,
            satoshis_per_output: per_output,
            fee_rate,
            recipient: Recipient::Single { address: source().to_string() },
        };
        let outcome = SplitBuilder::new(cfg).build(&utxos, &source().to_string(), KEY_HEX);

        if total < need {
            let is_insufficient = matches!(outcome, Err(SplitError::InsufficientFunds { .. }));
            prop_assert!(is_insufficient);
        } else {
            let result = outcome.unwrap();
            prop_assert_eq!(result.total_output + result.fee, result.total_input);
            prop_assert_eq!(result.total_input, total);
            prop_assert!(result.outputs.len() as u32 >= output_count);
            prop_assert_eq!(result.size_bytes, result.signed_bytes.len());
        }
    }

    #[test]
    fn extracted_descriptor_validates(
        amounts in prop::collection::vec(1u64..u64::MAX / 8, 1..6),
        pick in any::<prop::sample::Index>(),
        seed in any::<u8>(),
    ) {
        let raw = funding(&amounts, seed).to_bytes();
        let vout = pick.index(amounts.len()) as u32;
        let utxo = utxo_from_source(&raw, vout).unwrap();
        let validated = validate_utxo(0, &utxo).unwrap();
        prop_assert_eq!(validated.satoshis, amounts[vout as usize]);
        prop_assert_eq!(validated.vout, vout);
    }

    #[test]
    fn tampered_amount_never_signs(
        amount in 1_000u64..1_000_000,
        byte in 0usize..8,
        mask in 1u8..=255,
        seed in any::<u8>(),
    ) {
        let fund = funding(&[amount], seed);
        let mut tampered = fund.clone();
        tampered.outputs[0].satoshis ^= (mask as u64) << (8 * byte);

        let claim = Utxo::new(tampered.tx_id_hex(), 0, amount).with_raw_tx(tampered.to_bytes());
        let cfg = SplitConfig {
            output_count: 1,
            satoshis_per_output: 1,
            fee_rate: 0.0,
            recipient: Recipient::Single { address: source().to_string() },
        };
        let mut builder = SplitBuilder::new(cfg);
        let outcome = builder.build(&[claim], &source().to_string(), KEY_HEX);
        let is_mismatch = matches!(outcome, Err(SplitError::SatoshiMismatch { .. }));
        prop_assert!(is_mismatch);

        let original_id = Utxo::new(fund.tx_id_hex(), 0, amount).with_raw_tx(tampered.to_bytes());
        let is_txid_mismatch = matches!(validate_utxo(0, &original_id), Err(SplitError::TxidMismatch { .. }));
        prop_assert!(is_txid_mismatch);
    }
}
