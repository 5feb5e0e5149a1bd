/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid for the requested operation.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An input could not be signed (e.g. missing spent output).
    #[error("signing error: {0}")]
    SigningError(String),
    /// Binary/hex decoding failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Sighash type other than `ALL|FORKID` requested.
    #[error("unsupported sighash type 0x{0:02x}")]
    UnsupportedSighash(u32),
    /// An underlying script error (forwarded from `bsv-script`).
    #[error("script error: {0}")]
    Script(#[from] bsv_script::ScriptError),
    /// An underlying primitives error (forwarded from `bsv-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] bsv_primitives::PrimitivesError),
}
