//! secp256k1 private key used to sign split transaction inputs.
//!
//! Wraps a k256 `SigningKey` and adds WIF and hex parsing.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Mainnet WIF version byte.
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// Testnet WIF version byte.
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Flag byte appended to WIF payloads for compressed public keys.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random key from the OS RNG.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a key from a 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `InvalidPrivateKey` for a wrong length, a zero scalar, or a scalar
    /// not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let mut bytes = hex::decode(hex_str)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Parse a Base58Check WIF string.
    ///
    /// Accepts mainnet (`0x80`) and testnet (`0xef`) prefixes, compressed or
    /// uncompressed.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let mut payload = base58::check_decode(wif).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => e,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?;

        let result = match (payload.len(), payload.first()) {
            (_, Some(&p)) if p != MAINNET_WIF_PREFIX && p != TESTNET_WIF_PREFIX => Err(
                PrimitivesError::InvalidWif(format!("unknown version byte 0x{:02x}", p)),
            ),
            (34, _) if payload[33] != COMPRESS_MAGIC => Err(PrimitivesError::InvalidWif(
                "invalid compression flag".to_string(),
            )),
            (33, _) | (34, _) => Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN]),
            (len, _) => Err(PrimitivesError::InvalidWif(format!(
                "invalid payload length {}",
                len
            ))),
        };
        payload.zeroize();
        result
    }

    /// Encode as a compressed WIF string with the given version byte.
    pub fn to_wif_prefix(&self, prefix: u8) -> String {
        let mut payload = Vec::with_capacity(2 + PRIVATE_KEY_BYTES_LEN);
        payload.push(prefix);
        payload.extend_from_slice(&self.to_bytes());
        payload.push(COMPRESS_MAGIC);
        let wif = base58::check_encode(&payload);
        payload.zeroize();
        wif
    }

    /// Encode as a compressed mainnet WIF string.
    pub fn to_wif(&self) -> String {
        self.to_wif_prefix(MAINNET_WIF_PREFIX)
    }

    /// Return the 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    /// Derive the matching public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with RFC 6979 nonces.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}
