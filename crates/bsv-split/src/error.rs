//! Split engine error types.

use bsv_transaction::TransactionError;

/// Errors that stop a split build.
///
/// Every variant is raised before the first signature is produced, except
/// forwarded [`TransactionError`]s from signing itself.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// A UTXO has no source transaction bytes attached.
    #[error("input {index} ({txid}) has no source transaction bytes")]
    MissingSourceBytes {
        /// Position of the UTXO in the request.
        index: usize,
        /// Claimed txid.
        txid: String,
    },

    /// Source bytes are not hex or not a transaction.
    #[error("invalid source transaction{}: {reason}", at_input(.index))]
    InvalidTransactionHex {
        /// Position of the UTXO, when known.
        index: Option<usize>,
        /// Decoder message.
        reason: String,
    },

    /// The source bytes hash to a different txid than claimed.
    #[error("input {index}: claimed txid {claimed} but source bytes hash to {actual}")]
    TxidMismatch {
        index: usize,
        claimed: String,
        actual: String,
    },

    /// The claimed output index does not exist in the source transaction.
    #[error("input {index}: vout {vout} out of range, source has {output_count} outputs")]
    VoutOutOfRange {
        index: usize,
        vout: u32,
        output_count: usize,
    },

    /// The claimed amount differs from the amount in the source output.
    #[error("input {index}: claimed {claimed} satoshis but source output holds {actual}")]
    SatoshiMismatch {
        index: usize,
        claimed: u64,
        actual: u64,
    },

    /// Inputs do not cover outputs plus the estimated fee.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Total input satoshis.
        have: u64,
        /// Required outputs plus estimated fee.
        need: u64,
    },

    /// Recipient settings are inconsistent or unparseable.
    #[error("invalid recipient configuration: {0}")]
    InvalidRecipientConfig(String),

    /// Child key derivation failed.
    #[error("derivation failed at index {index}: {reason}")]
    DerivationFailure {
        /// Child index being derived.
        index: u32,
        reason: String,
    },

    /// Signing key is neither WIF nor 64-character hex.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Config or policy violates its bounds.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A spent output is not P2PKH.
    #[error("input {index}: spent output is not pay-to-public-key-hash")]
    UnsupportedScript { index: usize },

    /// A spent output is locked to a different key than the signing key.
    #[error("input {index}: spent output is not locked to the signing key")]
    KeyMismatch { index: usize },

    /// Forwarded from the transaction layer.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

fn at_input(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" for input {}", i),
        None => String::new(),
    }
}

/// Field-less discriminant of [`SplitError`], recorded in
/// [`BuildState::Failed`](crate::BuildState::Failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingSourceBytes,
    InvalidTransactionHex,
    TxidMismatch,
    VoutOutOfRange,
    SatoshiMismatch,
    InsufficientFunds,
    InvalidRecipientConfig,
    DerivationFailure,
    InvalidKeyFormat,
    InvalidConfig,
    UnsupportedScript,
    KeyMismatch,
    Transaction,
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SplitError::MissingSourceBytes { .. } => ErrorKind::MissingSourceBytes,
            SplitError::InvalidTransactionHex { .. } => ErrorKind::InvalidTransactionHex,
            SplitError::TxidMismatch { .. } => ErrorKind::TxidMismatch,
            SplitError::VoutOutOfRange { .. } => ErrorKind::VoutOutOfRange,
            SplitError::SatoshiMismatch { .. } => ErrorKind::SatoshiMismatch,
            SplitError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            SplitError::InvalidRecipientConfig(_) => ErrorKind::InvalidRecipientConfig,
            SplitError::DerivationFailure { .. } => ErrorKind::DerivationFailure,
            SplitError::InvalidKeyFormat(_) => ErrorKind::InvalidKeyFormat,
            SplitError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            SplitError::UnsupportedScript { .. } => ErrorKind::UnsupportedScript,
            SplitError::KeyMismatch { .. } => ErrorKind::KeyMismatch,
            SplitError::Transaction(_) => ErrorKind::Transaction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = SplitError::SatoshiMismatch { index: 2, claimed: 10, actual: 9 };
        assert_eq!(err.to_string(), "input 2: claimed 10 satoshis but source output holds 9");
        assert_eq!(err.kind(), ErrorKind::SatoshiMismatch);

        let err = SplitError::InvalidTransactionHex { index: Some(1), reason: "eof".into() };
        assert_eq!(err.to_string(), "invalid source transaction for input 1: eof");
        let err = SplitError::InvalidTransactionHex { index: None, reason: "eof".into() };
        assert_eq!(err.to_string(), "invalid source transaction: eof");
    }

    #[test]
    fn test_forwarded_transaction_error() {
        let err: SplitError = TransactionError::SigningError("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert_eq!(err.to_string(), "signing error: x");
    }
}
