//! Script templates for spending outputs.
//!
//! An [`UnlockingScriptTemplate`] turns a transaction and an input index into
//! the unlocking script for that input. P2PKH is the only template the split
//! engine spends from.

pub mod p2pkh;

use bsv_script::Script;

use crate::sighash::SighashCache;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Produces unlocking scripts for inputs of a transaction.
pub trait UnlockingScriptTemplate {
    /// Unlocking script for `input_index`, reusing precomputed sighash parts.
    fn sign_with_cache(
        &self,
        cache: &SighashCache<'_>,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<Script, TransactionError>;

    /// Unlocking script for `input_index`.
    fn sign(&self, tx: &Transaction, input_index: usize) -> Result<Script, TransactionError> {
        self.sign_with_cache(&SighashCache::new(tx), tx, input_index)
    }

    /// Upper-bound byte length of the script `sign` produces, used for fee
    /// estimation before signing.
    fn estimate_length(&self) -> usize;
}
