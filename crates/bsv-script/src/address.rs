/// P2PKH addresses.
///
/// An address is Base58Check(version || hash160(pubkey)) with version 0x00
/// on mainnet and 0x6f on testnet.

use std::fmt;
use std::str::FromStr;

use bsv_primitives::base58;
use bsv_primitives::ec::PublicKey;
use bsv_primitives::PrimitivesError;

use crate::{Script, ScriptError};

/// Mainnet P2PKH address version byte.
const MAINNET_P2PKH: u8 = 0x00;
/// Testnet P2PKH address version byte.
const TESTNET_P2PKH: u8 = 0x6f;

/// Network an address or key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    /// Prefix 0x00, addresses start with '1'.
    Mainnet,
    /// Prefix 0x6f, addresses start with 'm' or 'n'.
    Testnet,
}

impl Network {
    fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => MAINNET_P2PKH,
            Network::Testnet => TESTNET_P2PKH,
        }
    }
}

/// A P2PKH address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    /// The Base58Check string.
    pub address_string: String,
    /// RIPEMD-160(SHA-256(pubkey)).
    pub public_key_hash: [u8; 20],
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check address string.
    ///
    /// The network is taken from the version byte.
    ///
    /// # Returns
    /// `InvalidAddress` for bad characters, checksums or lengths;
    /// `UnsupportedAddress` for version bytes other than 0x00 and 0x6f.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(addr).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => {
                ScriptError::InvalidAddress(format!("checksum mismatch for '{}'", addr))
            }
            _ => ScriptError::InvalidAddress(format!("bad encoding for '{}'", addr)),
        })?;

        if payload.len() != 21 {
            return Err(ScriptError::InvalidAddress(format!(
                "invalid length for '{}'",
                addr
            )));
        }

        let network = match payload[0] {
            MAINNET_P2PKH => Network::Mainnet,
            TESTNET_P2PKH => Network::Testnet,
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&payload[1..21]);

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash: pkh,
            network,
        })
    }

    /// Encode a 20-byte key hash for `network`.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(network.p2pkh_version());
        payload.extend_from_slice(hash);

        Address {
            address_string: base58::check_encode(&payload),
            public_key_hash: *hash,
            network,
        }
    }

    /// Address of a public key's compressed encoding.
    pub fn from_public_key(pub_key: &PublicKey, network: Network) -> Self {
        Self::from_public_key_hash(&pub_key.hash160(), network)
    }

    /// The P2PKH locking script paying to this address.
    pub fn locking_script(&self) -> Script {
        Script::p2pkh(&self.public_key_hash)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKH_HEX: &str = "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b";
    const MAINNET: &str = "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr";
    const TESTNET: &str = "mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd";

    fn pkh() -> [u8; 20] {
        hex::decode(PKH_HEX).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_parse_both_networks() {
        let main = Address::from_string(MAINNET).unwrap();
        assert_eq!(main.network, Network::Mainnet);
        assert_eq!(hex::encode(main.public_key_hash), PKH_HEX);

        let test: Address = TESTNET.parse().unwrap();
        assert_eq!(test.network, Network::Testnet);
        assert_eq!(test.public_key_hash, main.public_key_hash);
    }

    #[test]
    fn test_encode_both_networks() {
        assert_eq!(Address::from_public_key_hash(&pkh(), Network::Mainnet).to_string(), MAINNET);
        assert_eq!(Address::from_public_key_hash(&pkh(), Network::Testnet).to_string(), TESTNET);
    }

    #[test]
    fn test_from_public_key() {
        let key = PublicKey::from_hex(
            "026cf33373a9f3f6c676b75b543180703df225f7f8edbffedc417718a8ad4e89ce",
        )
        .unwrap();
        let addr = Address::from_public_key(&key, Network::Mainnet);
        assert_eq!(hex::encode(addr.public_key_hash), "00ac6144c4db7b5790f343cf0477a65fb8a02eb7");
        assert_eq!(addr.address_string, "114ZWApV4EEU8frr7zygqQcB1V2BodGZuS");
        assert_eq!(
            Address::from_public_key(&key, Network::Testnet).address_string,
            "mfaWoDuTsFfiunLTqZx4fKpVsUctiDV9jk"
        );
    }

    #[test]
    fn test_locking_script() {
        let addr = Address::from_string(MAINNET).unwrap();
        let script = addr.locking_script();
        assert!(script.is_p2pkh());
        assert_eq!(script.to_hex(), format!("76a914{}88ac", PKH_HEX));
    }

    #[test]
    fn test_rejects_bad_addresses() {
        assert!(Address::from_string("ADD8E55").is_err());
        assert!(Address::from_string("").is_err());
        // last character altered
        assert!(Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMs").is_err());
        assert!(matches!(
            Address::from_string("27BvY7rFguYQvEL872Y7Fo77Y3EBApC2EK"),
            Err(ScriptError::UnsupportedAddress(_)) | Err(ScriptError::InvalidAddress(_))
        ));
    }
}
