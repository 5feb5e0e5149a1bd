//! Transaction input spending a previous output.

use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};
use bsv_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default sequence number: finalized, no relative lock-time.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// Serialized size of a signed P2PKH input:
/// outpoint(36) + len(1) + unlocking script(107) + sequence(4).
pub const P2PKH_INPUT_SIZE: usize = 148;

/// A single input in a BSV transaction.
///
/// The `spent_output` is the output this input consumes. It is never
/// serialized, but signing needs it because the FORKID sighash commits to
/// its script and value.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes (LE)    |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInput {
    /// Txid of the source transaction in internal byte order.
    pub source_txid: [u8; 32],

    /// Index of the output within the source transaction.
    pub source_tx_out_index: u32,

    pub sequence_number: u32,

    /// `None` until the input is signed.
    pub unlocking_script: Option<Script>,

    /// The output being spent, when known.
    pub spent_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// Unsigned input spending output `vout` of the transaction with internal
    /// txid `source_txid`.
    pub fn spending(source_txid: [u8; 32], vout: u32, spent_output: TransactionOutput) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index: vout,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            spent_output: Some(spent_output),
        }
    }

    /// Decode one input at the reader's position.
    ///
    /// An empty script decodes as `None`. The spent output is never known
    /// from the wire alone.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let source_txid = reader.read_hash().map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {}", e))
        })?;
        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {}", e))
        })?;
        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {}", e))
        })?;
        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {}", e))
        })?;

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script: (!script_bytes.is_empty()).then(|| Script::from_bytes(script_bytes)),
            spent_output: None,
        })
    }

    pub fn write_to(&self, writer: &mut BsvWriter) {
        self.write_outpoint(writer);
        match &self.unlocking_script {
            Some(script) => writer.write_var_bytes(script.to_bytes()),
            None => writer.write_varint(VarInt(0)),
        }
        writer.write_u32_le(self.sequence_number);
    }

    /// Write txid and output index, the 36-byte outpoint.
    pub fn write_outpoint(&self, writer: &mut BsvWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
    }

    /// The spent output, or a signing error naming what is missing.
    pub fn require_spent_output(&self) -> Result<&TransactionOutput, TransactionError> {
        self.spent_output.as_ref().ok_or_else(|| {
            TransactionError::SigningError(format!(
                "input spending {}:{} has no spent output attached",
                display_txid(&self.source_txid),
                self.source_tx_out_index
            ))
        })
    }
}

/// Byte-reversed hex, the way txids are displayed.
pub fn display_txid(internal: &[u8; 32]) -> String {
    let mut id = *internal;
    id.reverse();
    hex::encode(id)
}

/// Parse a displayed (byte-reversed) txid into internal byte order.
pub fn parse_display_txid(hex_str: &str) -> Result<[u8; 32], TransactionError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| TransactionError::SerializationError(format!("invalid txid hex: {}", e)))?;
    let mut id: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        TransactionError::SerializationError(format!("txid must be 32 bytes, got {}", b.len()))
    })?;
    id.reverse();
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "5126230725d1c909e2eb759b0ce7bfd927e8d399d7abd5e0998406b60854a393";

    #[test]
    fn test_txid_display_order() {
        let internal = parse_display_txid(TXID).unwrap();
        assert_eq!(internal[0], 0x93);
        assert_eq!(display_txid(&internal), TXID);
        assert!(parse_display_txid("abcd").is_err());
        assert!(parse_display_txid("zz").is_err());
    }

    #[test]
    fn test_unsigned_input_roundtrip() {
        let internal = parse_display_txid(TXID).unwrap();
        let input = TransactionInput::spending(internal, 3, TransactionOutput {
            satoshis: 10,
            locking_script: Script::new(),
            change: false,
        });
        let mut writer = BsvWriter::new();
        input.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), 32 + 4 + 1 + 4);

        let mut reader = BsvReader::new(&bytes);
        let read = TransactionInput::read_from(&mut reader).unwrap();
        assert_eq!(read.source_txid, internal);
        assert_eq!(read.source_tx_out_index, 3);
        assert_eq!(read.sequence_number, DEFAULT_SEQUENCE_NUMBER);
        assert!(read.unlocking_script.is_none());
        assert!(read.spent_output.is_none());
        assert!(read.require_spent_output().is_err());
    }
}
