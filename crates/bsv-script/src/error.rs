/// Errors raised while parsing scripts and addresses.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Unparseable ASM token.
    #[error("invalid asm token '{0}'")]
    InvalidAsm(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address version byte is neither P2PKH mainnet nor testnet.
    #[error("address not supported {0}")]
    UnsupportedAddress(String),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// A push runs past the end of the script.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds the 4-byte length limit.
    #[error("data too big")]
    DataTooBig,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] bsv_primitives::PrimitivesError),
}
