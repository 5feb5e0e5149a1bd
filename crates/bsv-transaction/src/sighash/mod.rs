//! Signature hash computation for transaction signing.
//!
//! BSV signs with the BIP-143-style digest selected by `SIGHASH_FORKID`. It
//! commits to the value and script of the output being spent, so a wrong
//! amount yields a signature the network rejects.
//!
//! Only `SIGHASH_ALL | SIGHASH_FORKID` is produced here. Its three
//! whole-transaction hashes (prevouts, sequences, outputs) do not depend on
//! the input being signed, so [`SighashCache`] computes them once per
//! transaction.
//!
//! See <https://github.com/bitcoin-sv/bitcoin-sv/blob/master/doc/abc/replay-protected-sighash.md#digest-algorithm>

use bsv_primitives::hash::sha256d;
use bsv_primitives::util::BsvWriter;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;

/// Replay-protection flag required on all BSV transactions after the UAHF fork.
pub const SIGHASH_FORKID: u32 = 0x40;

/// The standard BSV sighash type: ALL | FORKID.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;

/// Whole-transaction parts of the FORKID preimage.
#[derive(Clone, Debug)]
pub struct SighashCache<'a> {
    tx: &'a Transaction,
    hash_prevouts: [u8; 32],
    hash_sequence: [u8; 32],
    hash_outputs: [u8; 32],
}

impl<'a> SighashCache<'a> {
    pub fn new(tx: &'a Transaction) -> Self {
        let mut prevouts = BsvWriter::with_capacity(tx.inputs.len() * 36);
        let mut sequences = BsvWriter::with_capacity(tx.inputs.len() * 4);
        for input in &tx.inputs {
            input.write_outpoint(&mut prevouts);
            sequences.write_u32_le(input.sequence_number);
        }

        let mut outputs = BsvWriter::new();
        for output in &tx.outputs {
            output.write_to(&mut outputs);
        }

        SighashCache {
            tx,
            hash_prevouts: sha256d(prevouts.as_bytes()),
            hash_sequence: sha256d(sequences.as_bytes()),
            hash_outputs: sha256d(outputs.as_bytes()),
        }
    }

    /// Preimage for input `input_index` spending `satoshis` locked by
    /// `prev_output_script`.
    ///
    /// Layout: version, hashPrevouts, hashSequence, outpoint, scriptCode,
    /// value, nSequence, hashOutputs, nLocktime, sighash type.
    pub fn preimage(
        &self,
        input_index: usize,
        prev_output_script: &[u8],
        satoshis: u64,
        sighash_type: u32,
    ) -> Result<Vec<u8>, TransactionError> {
        if sighash_type != SIGHASH_ALL_FORKID {
            return Err(TransactionError::UnsupportedSighash(sighash_type));
        }
        let input = self.tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.tx.inputs.len()
            ))
        })?;

        let mut writer = BsvWriter::with_capacity(156 + prev_output_script.len());
        writer.write_u32_le(self.tx.version);
        writer.write_bytes(&self.hash_prevouts);
        writer.write_bytes(&self.hash_sequence);
        input.write_outpoint(&mut writer);
        writer.write_var_bytes(prev_output_script);
        writer.write_u64_le(satoshis);
        writer.write_u32_le(input.sequence_number);
        writer.write_bytes(&self.hash_outputs);
        writer.write_u32_le(self.tx.lock_time);
        writer.write_u32_le(sighash_type);
        Ok(writer.into_bytes())
    }

    /// Double SHA-256 of [`preimage`](Self::preimage).
    pub fn signature_hash(
        &self,
        input_index: usize,
        prev_output_script: &[u8],
        satoshis: u64,
        sighash_type: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let preimage = self.preimage(input_index, prev_output_script, satoshis, sighash_type)?;
        Ok(sha256d(&preimage))
    }
}

/// One-shot signature hash without a reusable cache.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    SighashCache::new(tx).signature_hash(input_index, prev_output_script, satoshis, sighash_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionInput;
    use crate::output::TransactionOutput;
    use bsv_script::Script;

    fn two_input_tx() -> Transaction {
        let mut tx = Transaction::new();
        for i in 0..2u8 {
            tx.add_input(TransactionInput::spending([i; 32], i as u32, TransactionOutput {
                satoshis: 1000,
                locking_script: Script::new(),
                change: false,
            }));
        }
        tx.add_output(TransactionOutput {
            satoshis: 1500,
            locking_script: Script::from_bytes(&[0x51]),
            change: false,
        });
        tx
    }

    #[test]
    fn test_preimage_layout() {
        let tx = two_input_tx();
        let script = [0xac; 25];
        let pre = SighashCache::new(&tx).preimage(1, &script, 1000, SIGHASH_ALL_FORKID).unwrap();
        // 4 + 32 + 32 + 36 + (1 + 25) + 8 + 4 + 32 + 4 + 4
        assert_eq!(pre.len(), 182);
        assert_eq!(&pre[68..100], &[1u8; 32]);
        assert_eq!(&pre[100..104], &1u32.to_le_bytes());
        assert_eq!(&pre[pre.len() - 4..], &SIGHASH_ALL_FORKID.to_le_bytes());
    }

    #[test]
    fn test_digest_commits_to_amount_and_index() {
        let tx = two_input_tx();
        let cache = SighashCache::new(&tx);
        let script = [0x76; 25];
        let a = cache.signature_hash(0, &script, 1000, SIGHASH_ALL_FORKID).unwrap();
        let b = cache.signature_hash(0, &script, 1001, SIGHASH_ALL_FORKID).unwrap();
        let c = cache.signature_hash(1, &script, 1000, SIGHASH_ALL_FORKID).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, signature_hash(&tx, 0, &script, SIGHASH_ALL_FORKID, 1000).unwrap());
    }

    #[test]
    fn test_rejects_other_types_and_indices() {
        let tx = two_input_tx();
        let cache = SighashCache::new(&tx);
        assert!(matches!(
            cache.preimage(0, &[], 1, SIGHASH_ALL),
            Err(TransactionError::UnsupportedSighash(0x01))
        ));
        assert!(cache.preimage(2, &[], 1, SIGHASH_ALL_FORKID).is_err());
    }
}
