/// Elliptic curve cryptography on secp256k1.
///
/// Private keys sign split inputs, public keys produce P2PKH key hashes,
/// and signatures are serialized as DER for unlocking scripts.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
