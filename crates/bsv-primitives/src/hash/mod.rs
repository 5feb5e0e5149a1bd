//! Hash functions used by transaction identifiers, addresses and key derivation.
//!
//! `sha256d` identifies transactions and signs sighash preimages, `hash160`
//! turns public keys into P2PKH key hashes, and `sha512_hmac` drives
//! BIP-32 child derivation.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute SHA-256(SHA-256(data)).
///
/// This is the network's transaction identifier hash: the txid of a
/// transaction is `sha256d` of its serialized bytes, displayed byte-reversed.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the RIPEMD-160 digest of `data`.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute RIPEMD-160(SHA-256(data)).
///
/// # Arguments
/// * `data` - Usually a SEC1-encoded public key.
///
/// # Returns
/// The 20-byte key hash embedded in P2PKH scripts and addresses.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute HMAC-SHA512 of `data` under `key`.
///
/// # Arguments
/// * `key` - The HMAC key (a BIP-32 chain code during derivation).
/// * `data` - The authenticated message.
///
/// # Returns
/// The 64-byte tag; BIP-32 splits it into the tweak (left) and the child
/// chain code (right).
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}
