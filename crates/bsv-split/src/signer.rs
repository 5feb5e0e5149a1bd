//! Signs every input of an assembled split.

use rayon::prelude::*;
use tracing::debug;

use bsv_primitives::ec::PrivateKey;
use bsv_transaction::sighash::SighashCache;
use bsv_transaction::template::p2pkh;
use bsv_transaction::template::UnlockingScriptTemplate;
use bsv_transaction::Transaction;

use crate::assembler::UnsignedSplit;
use crate::error::SplitError;

/// Parse a signing key given as WIF (either network) or 64 hex characters.
pub fn parse_private_key(key: &str) -> Result<PrivateKey, SplitError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(SplitError::InvalidKeyFormat("signing key is empty".to_string()));
    }
    if let Ok(pk) = PrivateKey::from_wif(key) {
        return Ok(pk);
    }
    if key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit()) {
        return PrivateKey::from_hex(key).map_err(|e| SplitError::InvalidKeyFormat(e.to_string()));
    }
    Err(SplitError::InvalidKeyFormat(
        "expected WIF or 64 hex characters".to_string(),
    ))
}

/// Sign all inputs of `split` with `key`.
///
/// Every spent output is checked to be P2PKH and locked to `key` before
/// the first signature. Signatures are computed in parallel over one shared
/// sighash cache and placed back in input order; RFC 6979 nonces make the
/// result byte-identical across runs.
pub fn sign_split(split: &UnsignedSplit, key: &PrivateKey) -> Result<Transaction, SplitError> {
    let key_hash = key.pub_key().hash160();
    for (index, input) in split.tx.inputs.iter().enumerate() {
        let spent = input.require_spent_output()?;
        let spent_hash = spent
            .locking_script
            .public_key_hash()
            .map_err(|_| SplitError::UnsupportedScript { index })?;
        if spent_hash != key_hash {
            return Err(SplitError::KeyMismatch { index });
        }
    }

    let unlocker = p2pkh::unlock(key.clone());
    let cache = SighashCache::new(&split.tx);
    let results: Vec<Result<_, SplitError>> = (0..split.tx.input_count())
        .into_par_iter()
        .map(|index| {
            unlocker
                .sign_with_cache(&cache, &split.tx, index)
                .map_err(SplitError::from)
        })
        .collect();
    let scripts = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    let mut signed = split.tx.clone();
    for (input, script) in signed.inputs.iter_mut().zip(scripts) {
        input.unlocking_script = Some(script);
    }
    debug!(inputs = signed.input_count(), "inputs signed");
    Ok(signed)
}
