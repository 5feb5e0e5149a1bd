//! BIP-32 extended public keys.
//!
//! Only public (non-hardened) derivation is supported: the split engine
//! derives receive or change addresses from an account-level `xpub`/`tpub`
//! without ever seeing a private key.
//!
//! See <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use std::fmt;
use std::str::FromStr;

use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};

use crate::base58;
use crate::ec::public_key::{PublicKey, COMPRESSED_LEN};
use crate::hash::{hash160, sha512_hmac};
use crate::PrimitivesError;

/// Version bytes of a mainnet extended public key (`xpub...`).
pub const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// Version bytes of a testnet extended public key (`tpub...`).
pub const TPUB_VERSION: [u8; 4] = [0x04, 0x35, 0x87, 0xcf];

const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
const TPRV_VERSION: [u8; 4] = [0x04, 0x35, 0x83, 0x94];

/// First child index that denotes hardened derivation.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Serialized length: version(4) depth(1) fingerprint(4) child(4) chain(32) key(33).
const SERIALIZED_LEN: usize = 78;

/// A BIP-32 node holding a public key and chain code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    version: [u8; 4],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
    chain_code: [u8; 32],
    public_key: PublicKey,
}

impl ExtendedPublicKey {
    /// Parse a Base58Check `xpub`/`tpub` string.
    ///
    /// # Returns
    /// `InvalidExtendedKey` for private extended keys, unknown versions,
    /// wrong lengths or keys that are not valid curve points.
    pub fn from_string(s: &str) -> Result<Self, PrimitivesError> {
        let payload = base58::check_decode(s.trim())?;
        if payload.len() != SERIALIZED_LEN {
            return Err(PrimitivesError::InvalidExtendedKey(format!(
                "expected {} bytes, got {}",
                SERIALIZED_LEN,
                payload.len()
            )));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&payload[0..4]);
        if version == XPRV_VERSION || version == TPRV_VERSION {
            return Err(PrimitivesError::InvalidExtendedKey(
                "private extended key supplied where a public one is required".to_string(),
            ));
        }
        if version != XPUB_VERSION && version != TPUB_VERSION {
            return Err(PrimitivesError::InvalidExtendedKey(format!(
                "unknown version {}",
                hex::encode(version)
            )));
        }

        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let mut child = [0u8; 4];
        child.copy_from_slice(&payload[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);

        let key_bytes = &payload[45..SERIALIZED_LEN];
        if key_bytes[0] != 0x02 && key_bytes[0] != 0x03 {
            return Err(PrimitivesError::InvalidExtendedKey(
                "key data is not a compressed public key".to_string(),
            ));
        }
        let public_key = PublicKey::from_bytes(key_bytes)
            .map_err(|e| PrimitivesError::InvalidExtendedKey(e.to_string()))?;

        Ok(ExtendedPublicKey {
            version,
            depth: payload[4],
            parent_fingerprint,
            child_number: u32::from_be_bytes(child),
            chain_code,
            public_key,
        })
    }

    /// Build a node from raw parts, e.g. a key exported by a hardware wallet.
    pub fn new(public_key: PublicKey, chain_code: [u8; 32], testnet: bool) -> Self {
        ExtendedPublicKey {
            version: if testnet { TPUB_VERSION } else { XPUB_VERSION },
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_number: 0,
            chain_code,
            public_key,
        }
    }

    /// Derive the non-hardened child at `index`.
    ///
    /// Computes `I = HMAC-SHA512(chain_code, serP(K) || ser32(index))` and
    /// returns the node `K + I_L·G` with chain code `I_R`.
    ///
    /// # Returns
    /// `PrimitivesError::Derivation` for hardened indices, a maximum-depth
    /// parent, `I_L ≥ n`, or a child at infinity. BIP-32 says to skip to the
    /// next index in the last two cases; callers decide that themselves.
    pub fn derive_child(&self, index: u32) -> Result<ExtendedPublicKey, PrimitivesError> {
        if index >= HARDENED_OFFSET {
            return Err(PrimitivesError::Derivation {
                index,
                reason: "hardened derivation needs a private key".to_string(),
            });
        }
        let depth = self.depth.checked_add(1).ok_or_else(|| PrimitivesError::Derivation {
            index,
            reason: "maximum depth reached".to_string(),
        })?;

        let mut data = Vec::with_capacity(COMPRESSED_LEN + 4);
        data.extend_from_slice(&self.public_key.to_compressed());
        data.extend_from_slice(&index.to_be_bytes());
        let i = sha512_hmac(&self.chain_code, &data);

        let mut il = [0u8; 32];
        il.copy_from_slice(&i[..32]);
        let tweak: Option<Scalar> = Scalar::from_repr(FieldBytes::from(il)).into();
        let tweak = tweak.ok_or_else(|| PrimitivesError::Derivation {
            index,
            reason: "tweak is not below the curve order".to_string(),
        })?;

        let public_key = self
            .public_key
            .add_generator_multiple(&tweak)
            .map_err(|e| PrimitivesError::Derivation {
                index,
                reason: e.to_string(),
            })?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);

        Ok(ExtendedPublicKey {
            version: self.version,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
            chain_code,
            public_key,
        })
    }

    /// Derive along a sequence of non-hardened indices.
    pub fn derive_path(&self, indices: &[u32]) -> Result<ExtendedPublicKey, PrimitivesError> {
        indices
            .iter()
            .try_fold(self.clone(), |node, &index| node.derive_child(index))
    }

    /// First four bytes of the key's hash160; children record it as their parent.
    pub fn fingerprint(&self) -> [u8; 4] {
        let h = hash160(&self.public_key.to_compressed());
        [h[0], h[1], h[2], h[3]]
    }

    /// The node's public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The node's chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Depth below the master node.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Index this node was derived at.
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    /// `true` for `tpub` keys.
    pub fn is_testnet(&self) -> bool {
        self.version == TPUB_VERSION
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SERIALIZED_LEN);
        out.extend_from_slice(&self.version);
        out.push(self.depth);
        out.extend_from_slice(&self.parent_fingerprint);
        out.extend_from_slice(&self.child_number.to_be_bytes());
        out.extend_from_slice(&self.chain_code);
        out.extend_from_slice(&self.public_key.to_compressed());
        out
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", base58::check_encode(&self.to_bytes()))
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}
