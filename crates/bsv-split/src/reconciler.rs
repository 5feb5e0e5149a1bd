//! Final figures measured from the signed bytes.

use bsv_transaction::Transaction;

use crate::assembler::UnsignedSplit;
use crate::error::SplitError;
use crate::types::{ResultInput, ResultOutput, TransactionResult};

/// Build the report for a signed split.
///
/// Size comes from the serialized transaction, not the estimate, and the
/// fee is whatever the inputs hold beyond the outputs. Only the last output
/// is tagged as change, and only when the assembler added one.
pub fn reconcile(split: &UnsignedSplit, signed: &Transaction) -> Result<TransactionResult, SplitError> {
    if signed.output_count() != split.output_addresses.len() {
        return Err(SplitError::InvalidConfig(format!(
            "signed transaction has {} outputs, expected {}",
            signed.output_count(),
            split.output_addresses.len()
        )));
    }

    let signed_bytes = signed.to_bytes();
    let size_bytes = signed_bytes.len();
    let total_output = signed.total_output_satoshis()?;
    let fee = split.total_input.checked_sub(total_output).ok_or(SplitError::InsufficientFunds {
        have: split.total_input,
        need: total_output,
    })?;

    let inputs = split
        .inputs
        .iter()
        .map(|u| ResultInput {
            txid: u.txid.clone(),
            vout: u.vout,
            satoshis: u.satoshis,
        })
        .collect();

    let last = signed.output_count().saturating_sub(1);
    let outputs = signed
        .outputs
        .iter()
        .zip(&split.output_addresses)
        .enumerate()
        .map(|(i, (output, address))| ResultOutput {
            address: address.to_string(),
            satoshis: output.satoshis,
            is_change: split.change.is_some() && i == last,
        })
        .collect();

    Ok(TransactionResult {
        txid: signed.tx_id_hex(),
        signed_bytes,
        inputs,
        outputs,
        total_input: split.total_input,
        total_output,
        fee,
        fee_rate: fee_rate(fee, size_bytes),
        size_bytes,
    })
}

/// Satoshis per byte rounded to two decimals.
pub fn fee_rate(fee: u64, size_bytes: usize) -> f64 {
    if size_bytes == 0 {
        return 0.0;
    }
    (fee as f64 / size_bytes as f64 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::policy::SplitPolicy;
    use crate::signer::sign_split;
    use crate::types::{Recipient, SplitConfig, ValidatedUtxo};
    use bsv_primitives::ec::PrivateKey;
    use bsv_script::{Address, Network};

    fn signed_split(satoshis: u64) -> (UnsignedSplit, Transaction) {
        let key = PrivateKey::from_hex(&format!("{:064x}", 42)).unwrap();
        let source = Address::from_public_key(&key.pub_key(), Network::Mainnet);
        let utxo = ValidatedUtxo {
            index: 0,
            source_txid: [3; 32],
            txid: bsv_transaction::input::display_txid(&[3; 32]),
            vout: 1,
            satoshis,
            locking_script: source.locking_script(),
        };
        let cfg = SplitConfig {
            output_count: 5,
            satoshis_per_output: 1_000,
            fee_rate: 1.0,
            recipient: Recipient::Single { address: source.to_string() },
        };
        let split = assemble(&[utxo], &vec![source.clone(); 5], &source, &cfg, &SplitPolicy::default()).unwrap();
        let signed = sign_split(&split, &key).unwrap();
        (split, signed)
    }

    #[test]
    fn test_report_with_change() {
        let (split, signed) = signed_split(10_000);
        let result = reconcile(&split, &signed).unwrap();
        assert_eq!(result.total_input, 10_000);
        assert_eq!(result.total_output + result.fee, result.total_input);
        assert_eq!(result.fee, 362);
        assert_eq!(result.size_bytes, signed.size());
        assert!(result.size_bytes <= 362);
        assert_eq!(result.outputs.len(), 6);
        assert!(result.outputs[5].is_change);
        assert_eq!(result.outputs[5].satoshis, 4_638);
        assert!(result.outputs[..5].iter().all(|o| !o.is_change));
        assert_eq!(result.inputs[0].vout, 1);
        assert_eq!(result.txid, signed.tx_id_hex());
        assert_eq!(result.signed_hex(), signed.to_hex());
    }

    #[test]
    fn test_report_without_change() {
        let (split, signed) = signed_split(5_362);
        let result = reconcile(&split, &signed).unwrap();
        assert_eq!(result.outputs.len(), 5);
        assert!(result.outputs.iter().all(|o| !o.is_change));
        assert_eq!(result.fee, 362);
    }

    #[test]
    fn test_fee_rate_rounding() {
        assert_eq!(fee_rate(362, 360), 1.01);
        assert_eq!(fee_rate(130, 260), 0.5);
        assert_eq!(fee_rate(1, 3), 0.33);
        assert_eq!(fee_rate(5, 0), 0.0);
    }
}
