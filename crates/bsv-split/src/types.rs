//! Request and result types for split builds.
//!
//! Everything a UI layer hands in or gets back is serde-(de)serializable
//! with camelCase field names; byte fields travel as hex strings.

use serde::{Deserialize, Serialize};

use bsv_script::Script;

use crate::error::SplitError;

/// One claimed spendable output.
///
/// `raw_tx` holds the complete source transaction. It may be missing while
/// the caller is still collecting UTXOs, but validation refuses to proceed
/// without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// Claimed txid of the source transaction, displayed byte order.
    pub txid: String,
    pub vout: u32,
    /// Claimed amount of the output.
    pub satoshis: u64,
    #[serde(
        rename = "rawTxHex",
        default,
        with = "hex_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_tx: Option<Vec<u8>>,
}

impl Utxo {
    /// Claim without source bytes.
    pub fn new(txid: impl Into<String>, vout: u32, satoshis: u64) -> Self {
        Utxo {
            txid: txid.into(),
            vout,
            satoshis,
            raw_tx: None,
        }
    }

    pub fn with_raw_tx(mut self, raw_tx: Vec<u8>) -> Self {
        self.raw_tx = Some(raw_tx);
        self
    }

    /// Attach hex-encoded source bytes.
    ///
    /// # Returns
    /// `InvalidTransactionHex` when `raw_hex` is not valid hex. Whether the
    /// bytes form a transaction is checked during validation.
    pub fn with_raw_tx_hex(mut self, raw_hex: &str) -> Result<Self, SplitError> {
        let bytes = hex::decode(raw_hex.trim()).map_err(|e| SplitError::InvalidTransactionHex {
            index: None,
            reason: e.to_string(),
        })?;
        self.raw_tx = Some(bytes);
        Ok(self)
    }
}

/// A UTXO whose claims have been proven against its source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUtxo {
    /// Position in the request.
    pub index: usize,
    /// Txid in internal byte order, as it appears in an outpoint.
    pub source_txid: [u8; 32],
    /// Txid as displayed.
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    /// Script of the spent output, taken from the source bytes.
    pub locking_script: Script,
}

/// Where the split outputs go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Recipient {
    /// Every output pays the same address.
    #[serde(rename_all = "camelCase")]
    Single { address: String },
    /// Outputs pay consecutive children of an extended public key.
    #[serde(rename_all = "camelCase")]
    Xpub {
        /// `xpub...` or `tpub...`.
        xpub: String,
        /// Path hint such as `m/44'/236'/0'/0`; selects the receive or
        /// change branch.
        #[serde(default)]
        path: String,
        #[serde(default)]
        start_index: u32,
        /// Addresses previewed by the caller; used verbatim when present.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolved_addresses: Option<Vec<String>>,
    },
}

/// Parameters of one split request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitConfig {
    pub output_count: u32,
    pub satoshis_per_output: u64,
    /// Satoshis per byte.
    pub fee_rate: f64,
    pub recipient: Recipient,
}

impl SplitConfig {
    /// Check the numeric bounds.
    ///
    /// # Returns
    /// `InvalidConfig` for a zero output count, zero output value, a
    /// negative or non-finite fee rate, or a total that overflows `u64`.
    pub fn validate(&self) -> Result<(), SplitError> {
        if self.output_count == 0 {
            return Err(SplitError::InvalidConfig(
                "output count must be at least 1".to_string(),
            ));
        }
        if self.satoshis_per_output == 0 {
            return Err(SplitError::InvalidConfig(
                "satoshis per output must be positive".to_string(),
            ));
        }
        if !self.fee_rate.is_finite() || self.fee_rate < 0.0 {
            return Err(SplitError::InvalidConfig(format!(
                "fee rate must be a non-negative number, got {}",
                self.fee_rate
            )));
        }
        self.required_output()?;
        Ok(())
    }

    /// `output_count · satoshis_per_output`.
    pub fn required_output(&self) -> Result<u64, SplitError> {
        (self.output_count as u64)
            .checked_mul(self.satoshis_per_output)
            .ok_or_else(|| SplitError::InvalidConfig("total output overflows u64".to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SplitError> {
        serde_json::from_str(json).map_err(|e| SplitError::InvalidConfig(e.to_string()))
    }
}

/// An input of the signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultInput {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
}

/// An output of the signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOutput {
    pub address: String,
    pub satoshis: u64,
    pub is_change: bool,
}

/// Report of a successful build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub txid: String,
    #[serde(rename = "signedHex", with = "hex_vec")]
    pub signed_bytes: Vec<u8>,
    pub inputs: Vec<ResultInput>,
    pub outputs: Vec<ResultOutput>,
    pub total_input: u64,
    pub total_output: u64,
    pub fee: u64,
    /// Actual satoshis per byte, two decimals.
    pub fee_rate: f64,
    pub size_bytes: usize,
}

impl TransactionResult {
    pub fn signed_hex(&self) -> String {
        hex::encode(&self.signed_bytes)
    }

    pub fn to_json(&self) -> Result<String, SplitError> {
        serde_json::to_string(self).map_err(|e| SplitError::InvalidConfig(e.to_string()))
    }
}

mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

mod hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&hex::encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
