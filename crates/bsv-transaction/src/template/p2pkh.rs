//! Pay-to-Public-Key-Hash (P2PKH) template.
//!
//! Locking: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Unlocking: `<DER signature || sighash byte> <compressed pubkey>`.

use bsv_primitives::ec::{PrivateKey, PublicKey, Signature};
use bsv_script::{Address, Script};

use crate::sighash::{SighashCache, SIGHASH_ALL_FORKID};
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Unlocking script length with a 72-byte DER signature:
/// push(1) + sig(72) + flag(1) + push(1) + pubkey(33) = 108.
/// Low-S signatures are at most 71 bytes, giving 107.
pub const UNLOCKING_SCRIPT_LEN: usize = 107;

/// P2PKH locking script for `address`.
pub fn lock(address: &Address) -> Script {
    address.locking_script()
}

/// P2PKH unlocker signing with `private_key` under `SIGHASH_ALL | SIGHASH_FORKID`.
pub fn unlock(private_key: PrivateKey) -> P2PKH {
    P2PKH { private_key }
}

/// Signing template for P2PKH inputs.
pub struct P2PKH {
    private_key: PrivateKey,
}

impl P2PKH {
    pub fn public_key(&self) -> PublicKey {
        self.private_key.pub_key()
    }
}

impl UnlockingScriptTemplate for P2PKH {
    /// Sign input `input_index` against its attached spent output.
    ///
    /// Nonces follow RFC 6979, so the same transaction and key always give
    /// the same script.
    ///
    /// # Returns
    /// `SigningError` when the input is missing or has no spent output,
    /// `Script(NotP2PKH)` when the spent output is not P2PKH.
    fn sign_with_cache(
        &self,
        cache: &SighashCache<'_>,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<Script, TransactionError> {
        let input = tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            ))
        })?;
        let spent = input.require_spent_output()?;
        spent.locking_script.public_key_hash()?;

        let sig_hash = cache.signature_hash(
            input_index,
            spent.locking_script.to_bytes(),
            spent.satoshis,
            SIGHASH_ALL_FORKID,
        )?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(SIGHASH_ALL_FORKID as u8);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&self.private_key.pub_key().to_compressed())?;
        Ok(script)
    }

    fn estimate_length(&self) -> usize {
        UNLOCKING_SCRIPT_LEN
    }
}

/// Check the unlocking script of a signed P2PKH input.
///
/// Confirms the pushed key hashes to the spent output's key hash and that
/// the signature verifies over the FORKID digest.
///
/// # Returns
/// `Ok(false)` for a well-formed script whose key or signature does not
/// match; errors when the input is unsigned or has no spent output.
pub fn verify(tx: &Transaction, input_index: usize) -> Result<bool, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!("input index {} out of range", input_index))
    })?;
    let spent = input.require_spent_output()?;
    let expected_pkh = spent.locking_script.public_key_hash()?;
    let unlocking = input.unlocking_script.as_ref().ok_or_else(|| {
        TransactionError::InvalidTransaction(format!("input {} is not signed", input_index))
    })?;

    let chunks = unlocking.chunks()?;
    let (sig_push, key_push) = match chunks.as_slice() {
        [sig, key] => match (&sig.data, &key.data) {
            (Some(sig), Some(key)) if !sig.is_empty() => (sig, key),
            _ => return Ok(false),
        },
        _ => return Ok(false),
    };

    let (flag, der) = match sig_push.split_last() {
        Some((&flag, der)) => (flag, der),
        None => return Ok(false),
    };
    if flag as u32 != SIGHASH_ALL_FORKID {
        return Ok(false);
    }
    let pub_key = match PublicKey::from_bytes(key_push) {
        Ok(k) => k,
        Err(_) => return Ok(false),
    };
    if pub_key.hash160() != expected_pkh {
        return Ok(false);
    }
    let signature = match Signature::from_der(der) {
        Ok(s) => s,
        Err(_) => return Ok(false),
    };

    let sig_hash = tx.calc_input_signature_hash(input_index, SIGHASH_ALL_FORKID)?;
    Ok(pub_key.verify(&sig_hash, &signature))
}
