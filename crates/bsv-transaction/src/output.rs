//! Transaction output: a satoshi amount locked by a script.

use bsv_primitives::util::{BsvReader, BsvWriter, VarInt};
use bsv_script::{Address, Script};

use crate::TransactionError;

/// Serialized size of a P2PKH output: value(8) + len(1) + script(25).
pub const P2PKH_OUTPUT_SIZE: usize = 34;

/// A single output in a BSV transaction.
///
/// # Wire format
///
/// | Field            | Size           |
/// |------------------|----------------|
/// | satoshis         | 8 bytes (LE)   |
/// | script length    | VarInt         |
/// | locking_script   | variable       |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value locked by this output.
    pub satoshis: u64,

    /// The locking script (scriptPubKey).
    pub locking_script: Script,

    /// Local-only marker for the output returning leftover value to the
    /// spender. Not serialized, and lost on a decode round trip.
    pub change: bool,
}

impl TransactionOutput {
    /// P2PKH output paying `satoshis` to `address`.
    pub fn pay_to(address: &Address, satoshis: u64) -> Self {
        TransactionOutput {
            satoshis,
            locking_script: address.locking_script(),
            change: false,
        }
    }

    /// Same as [`pay_to`](Self::pay_to) with the change marker set.
    pub fn change_to(address: &Address, satoshis: u64) -> Self {
        TransactionOutput {
            change: true,
            ..Self::pay_to(address, satoshis)
        }
    }

    /// Decode one output at the reader's position.
    pub fn read_from(reader: &mut BsvReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {}", e))
        })?;
        let script_bytes = reader.read_var_bytes().map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {}", e))
        })?;

        Ok(TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(script_bytes),
            change: false,
        })
    }

    pub fn write_to(&self, writer: &mut BsvWriter) {
        writer.write_u64_le(self.satoshis);
        let script_bytes = self.locking_script.to_bytes();
        writer.write_varint(VarInt::from(script_bytes.len()));
        writer.write_bytes(script_bytes);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BsvWriter::with_capacity(P2PKH_OUTPUT_SIZE);
        self.write_to(&mut writer);
        writer.into_bytes()
    }
}
