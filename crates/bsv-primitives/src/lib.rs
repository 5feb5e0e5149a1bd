/// BSV primitives for the split engine.
///
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
/// - Base58Check encoding
/// - Wire-format reader/writer and VarInt
/// - secp256k1 keys and deterministic ECDSA signatures
/// - BIP-32 extended public keys

pub mod hash;
pub mod util;
pub mod base58;
pub mod ec;
pub mod bip32;

mod error;
pub use error::PrimitivesError;
