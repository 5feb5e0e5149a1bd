//! Proves claimed UTXOs against the bytes of their source transactions.
//!
//! A claim is only trusted once the attached bytes hash to the claimed
//! txid, contain the claimed output index, and record the claimed amount at
//! that index. FORKID signatures commit to the spent amount, so signing on
//! an unproven claim can produce an invalid transaction.

use rayon::prelude::*;
use tracing::debug;

use bsv_transaction::Transaction;

use crate::error::SplitError;
use crate::types::{Utxo, ValidatedUtxo};

/// Validate one claim; `index` is its position in the request.
///
/// Checks run in a fixed order: bytes present, bytes decode, txid, vout,
/// amount. The first failing check is reported.
pub fn validate_utxo(index: usize, utxo: &Utxo) -> Result<ValidatedUtxo, SplitError> {
    let raw = utxo.raw_tx.as_deref().ok_or_else(|| SplitError::MissingSourceBytes {
        index,
        txid: utxo.txid.clone(),
    })?;

    let source = Transaction::from_bytes(raw).map_err(|e| SplitError::InvalidTransactionHex {
        index: Some(index),
        reason: e.to_string(),
    })?;

    let source_txid = source.tx_id();
    let actual = bsv_transaction::input::display_txid(&source_txid);
    if !actual.eq_ignore_ascii_case(utxo.txid.trim()) {
        return Err(SplitError::TxidMismatch {
            index,
            claimed: utxo.txid.clone(),
            actual,
        });
    }

    let output = source
        .outputs
        .get(utxo.vout as usize)
        .ok_or(SplitError::VoutOutOfRange {
            index,
            vout: utxo.vout,
            output_count: source.outputs.len(),
        })?;

    if output.satoshis != utxo.satoshis {
        return Err(SplitError::SatoshiMismatch {
            index,
            claimed: utxo.satoshis,
            actual: output.satoshis,
        });
    }

    debug!(index, txid = %actual, vout = utxo.vout, satoshis = output.satoshis, "utxo validated");

    Ok(ValidatedUtxo {
        index,
        source_txid,
        txid: actual,
        vout: utxo.vout,
        satoshis: output.satoshis,
        locking_script: output.locking_script.clone(),
    })
}

/// Validate every claim, in parallel.
///
/// # Returns
/// The validated UTXOs in request order, or the error of the
/// lowest-indexed failing claim.
pub fn validate_utxos(utxos: &[Utxo]) -> Result<Vec<ValidatedUtxo>, SplitError> {
    let results: Vec<Result<ValidatedUtxo, SplitError>> = utxos
        .par_iter()
        .enumerate()
        .map(|(index, utxo)| validate_utxo(index, utxo))
        .collect();
    results.into_iter().collect()
}

/// Describe output `vout` of a raw transaction as a UTXO claim.
///
/// The returned claim carries the bytes it was read from, so validating it
/// always succeeds.
pub fn utxo_from_source(raw_tx: &[u8], vout: u32) -> Result<Utxo, SplitError> {
    let source = Transaction::from_bytes(raw_tx).map_err(|e| SplitError::InvalidTransactionHex {
        index: None,
        reason: e.to_string(),
    })?;
    let output = source
        .outputs
        .get(vout as usize)
        .ok_or(SplitError::VoutOutOfRange {
            index: 0,
            vout,
            output_count: source.outputs.len(),
        })?;
    Ok(Utxo::new(source.tx_id_hex(), vout, output.satoshis).with_raw_tx(raw_tx.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsv_script::{Address, Script};
    use bsv_transaction::{TransactionInput, TransactionOutput};

    fn source_tx() -> Transaction {
        let addr = Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr").unwrap();
        let mut tx = Transaction::new();
        let mut input = TransactionInput::spending([7; 32], 0, TransactionOutput::pay_to(&addr, 1));
        input.unlocking_script = Some(Script::from_bytes(&[0x51]));
        tx.add_input(input);
        tx.add_output(TransactionOutput::pay_to(&addr, 2_500));
        tx.add_output(TransactionOutput::pay_to(&addr, 7_500));
        tx
    }

    fn claim(vout: u32, satoshis: u64) -> Utxo {
        let tx = source_tx();
        Utxo::new(tx.tx_id_hex(), vout, satoshis).with_raw_tx(tx.to_bytes())
    }

    #[test]
    fn test_valid_claim() {
        let v = validate_utxo(0, &claim(1, 7_500)).unwrap();
        assert_eq!(v.satoshis, 7_500);
        assert_eq!(v.txid, source_tx().tx_id_hex());
        assert_eq!(v.source_txid, source_tx().tx_id());
        assert!(v.locking_script.is_p2pkh());
    }

    #[test]
    fn test_txid_compare_ignores_case() {
        let mut utxo = claim(0, 2_500);
        utxo.txid = utxo.txid.to_uppercase();
        assert!(validate_utxo(0, &utxo).is_ok());
    }

    #[test]
    fn test_each_failure_kind() {
        let mut missing = claim(0, 2_500);
        missing.raw_tx = None;
        assert!(matches!(validate_utxo(3, &missing), Err(SplitError::MissingSourceBytes { index: 3, .. })));

        let mut garbage = claim(0, 2_500);
        garbage.raw_tx = Some(vec![0x01, 0x02]);
        assert!(matches!(
            validate_utxo(0, &garbage),
            Err(SplitError::InvalidTransactionHex { index: Some(0), .. })
        ));

        let mut wrong_id = claim(0, 2_500);
        wrong_id.txid = "00".repeat(32);
        assert!(matches!(validate_utxo(0, &wrong_id), Err(SplitError::TxidMismatch { .. })));

        assert!(matches!(
            validate_utxo(0, &claim(2, 2_500)),
            Err(SplitError::VoutOutOfRange { vout: 2, output_count: 2, .. })
        ));
        assert!(matches!(
            validate_utxo(0, &claim(0, 2_501)),
            Err(SplitError::SatoshiMismatch { claimed: 2_501, actual: 2_500, .. })
        ));
    }

    #[test]
    fn test_batch_reports_lowest_index() {
        let utxos = vec![
            claim(0, 2_500),
            claim(5, 1),
            claim(1, 7_500),
            claim(0, 9),
        ];
        match validate_utxos(&utxos) {
            Err(SplitError::VoutOutOfRange { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(validate_utxos(&utxos[..1]).unwrap().len(), 1);
        assert!(validate_utxos(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_descriptor_from_source() {
        let raw = source_tx().to_bytes();
        let utxo = utxo_from_source(&raw, 1).unwrap();
        assert_eq!(utxo.satoshis, 7_500);
        assert!(validate_utxo(0, &utxo).is_ok());
        assert!(utxo_from_source(&raw, 9).is_err());
        assert!(utxo_from_source(&raw[1..], 0).is_err());
    }
}
