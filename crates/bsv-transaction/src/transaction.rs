//! Core transaction type.
//!
//! Holds version, inputs, outputs and lock time, with the standard wire
//! codec, the double-SHA-256 transaction id, and per-input signature hashes.

use bsv_primitives::hash::sha256d;
use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};

use crate::input::{display_txid, TransactionInput};
use crate::output::TransactionOutput;
use crate::sighash::SighashCache;
use crate::TransactionError;

/// Smallest possible encoded input (empty script) and output.
const MIN_INPUT_SIZE: usize = 41;
const MIN_OUTPUT_SIZE: usize = 9;

/// A BSV transaction.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Empty version-1 transaction with lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: 1,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Parse a hex-encoded transaction.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction from `bytes`.
    ///
    /// # Returns
    /// `SerializationError` when the data is truncated, malformed, or has
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = BsvReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Decode a transaction at the reader's position.
    ///
    /// Element counts come from untrusted bytes, so preallocation is bounded
    /// by what the remaining data could actually hold.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading version: {}", e))
        })?;

        let input_count = read_count(reader, "input count", MIN_INPUT_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = read_count(reader, "output count", MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading lock time: {}", e))
        })?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BsvWriter::with_capacity(
            10 + self.inputs.len() * crate::input::P2PKH_INPUT_SIZE
                + self.outputs.len() * crate::output::P2PKH_OUTPUT_SIZE,
        );
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Double SHA-256 of the serialized bytes, in internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// The txid as conventionally displayed (byte-reversed hex).
    pub fn tx_id_hex(&self) -> String {
        display_txid(&self.tx_id())
    }

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of output values.
    ///
    /// # Returns
    /// `InvalidTransaction` if the sum overflows `u64`.
    pub fn total_output_satoshis(&self) -> Result<u64, TransactionError> {
        self.outputs.iter().try_fold(0u64, |acc, o| {
            acc.checked_add(o.satoshis).ok_or_else(|| {
                TransactionError::InvalidTransaction("output total overflows u64".to_string())
            })
        })
    }

    /// Sum of the values of all spent outputs.
    ///
    /// # Returns
    /// `InvalidTransaction` when an input has no spent output attached or
    /// the sum overflows.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs.iter().try_fold(0u64, |acc, input| {
            let spent = input.spent_output.as_ref().ok_or_else(|| {
                TransactionError::InvalidTransaction(
                    "missing spent output on input".to_string(),
                )
            })?;
            acc.checked_add(spent.satoshis).ok_or_else(|| {
                TransactionError::InvalidTransaction("input total overflows u64".to_string())
            })
        })
    }

    /// Serialized length in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Signature hash for `input_index` using its attached spent output.
    ///
    /// Callers signing many inputs should build one [`SighashCache`] instead.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_flag: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;
        let spent = input.require_spent_output()?;
        SighashCache::new(self).signature_hash(
            input_index,
            spent.locking_script.to_bytes(),
            spent.satoshis,
            sighash_flag,
        )
    }
}

fn read_count(
    reader: &mut BsvReader,
    what: &str,
    min_element_size: usize,
) -> Result<usize, TransactionError> {
    let count = reader
        .read_varint()
        .map_err(|e| TransactionError::SerializationError(format!("reading {}: {}", what, e)))?
        .value();
    let fits = reader.remaining() / min_element_size;
    if count > fits as u64 {
        return Err(TransactionError::SerializationError(format!(
            "{} {} exceeds remaining data",
            what, count
        )));
    }
    Ok(count as usize)
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    /// Display the transaction as its hex-encoded serialization.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
