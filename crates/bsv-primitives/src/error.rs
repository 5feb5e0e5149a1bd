/// Unified error type for primitives operations.
///
/// Covers key parsing, signature encoding, Base58Check decoding, wire-format
/// reads and BIP-32 derivation.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("cannot derive child {index}: {reason}")]
    Derivation { index: u32, reason: String },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<k256::elliptic_curve::Error> for PrimitivesError {
    fn from(_: k256::elliptic_curve::Error) -> Self {
        PrimitivesError::InvalidPublicKey("point is not on secp256k1".to_string())
    }
}
