//! Totals, change and the unsigned split transaction.

use tracing::{debug, warn};

use bsv_script::Address;
use bsv_transaction::{Transaction, TransactionInput, TransactionOutput};

use crate::error::SplitError;
use crate::fee;
use crate::policy::SplitPolicy;
use crate::types::{SplitConfig, ValidatedUtxo};

/// A split transaction before signing, with the figures it was built from.
///
/// Every input carries its spent output, so the transaction can be signed
/// without looking anything up again.
#[derive(Debug, Clone)]
pub struct UnsignedSplit {
    pub tx: Transaction,
    pub inputs: Vec<ValidatedUtxo>,
    /// Destination of each output, change last when present.
    pub output_addresses: Vec<Address>,
    pub total_input: u64,
    /// Fee assumed for the pre-flight check, with a change output counted.
    pub estimated_fee: u64,
    /// Value of the change output, if one was added.
    pub change: Option<u64>,
}

/// Sum of validated input amounts.
pub fn total_input(utxos: &[ValidatedUtxo]) -> Result<u64, SplitError> {
    utxos.iter().try_fold(0u64, |acc, u| {
        acc.checked_add(u.satoshis)
            .ok_or_else(|| SplitError::InvalidConfig("input total overflows u64".to_string()))
    })
}

/// Pre-flight sufficiency gate.
///
/// The fee is estimated for `output_count + 1` outputs so the answer holds
/// whether or not change is emitted later.
///
/// # Returns
/// The estimated fee, or `InsufficientFunds` when `total_input` does not
/// cover the outputs plus that fee.
pub fn check_funds(
    total_input: u64,
    input_count: usize,
    config: &SplitConfig,
) -> Result<u64, SplitError> {
    let required = config.required_output()?;
    let estimated_fee = fee::estimate_fee(
        input_count,
        config.output_count as usize + 1,
        config.fee_rate,
    );
    let need = required.checked_add(estimated_fee).ok_or_else(|| {
        SplitError::InvalidConfig("required output plus fee overflows u64".to_string())
    })?;
    if total_input < need {
        return Err(SplitError::InsufficientFunds {
            have: total_input,
            need,
        });
    }
    Ok(estimated_fee)
}

/// Build the unsigned transaction.
///
/// Inputs keep request order. Outputs are the `output_count` equal outputs
/// in `recipients` order, then change to `source` when it is non-zero and
/// reaches the dust limit. Smaller leftovers are left to the miner.
pub fn assemble(
    utxos: &[ValidatedUtxo],
    recipients: &[Address],
    source: &Address,
    config: &SplitConfig,
    policy: &SplitPolicy,
) -> Result<UnsignedSplit, SplitError> {
    if recipients.len() != config.output_count as usize {
        return Err(SplitError::InvalidRecipientConfig(format!(
            "{} recipients for {} outputs",
            recipients.len(),
            config.output_count
        )));
    }

    let total_input = total_input(utxos)?;
    let estimated_fee = check_funds(total_input, utxos.len(), config)?;
    let required = config.required_output()?;
    // check_funds guarantees total_input >= required + estimated_fee
    let leftover = total_input - required - estimated_fee;

    let mut tx = Transaction::new();
    for utxo in utxos {
        let spent = TransactionOutput {
            satoshis: utxo.satoshis,
            locking_script: utxo.locking_script.clone(),
            change: false,
        };
        tx.add_input(TransactionInput::spending(utxo.source_txid, utxo.vout, spent));
    }

    let mut output_addresses = recipients.to_vec();
    for address in recipients {
        tx.add_output(TransactionOutput::pay_to(address, config.satoshis_per_output));
    }

    let change = if leftover > 0 && leftover >= policy.dust_limit {
        tx.add_output(TransactionOutput::change_to(source, leftover));
        output_addresses.push(source.clone());
        Some(leftover)
    } else {
        if leftover > 0 {
            warn!(
                leftover,
                dust_limit = policy.dust_limit,
                "change below dust limit added to fee"
            );
        }
        None
    };

    debug!(
        inputs = tx.input_count(),
        outputs = tx.output_count(),
        total_input,
        estimated_fee,
        change = change.unwrap_or(0),
        "split assembled"
    );

    Ok(UnsignedSplit {
        tx,
        inputs: utxos.to_vec(),
        output_addresses,
        total_input,
        estimated_fee,
        change,
    })
}
