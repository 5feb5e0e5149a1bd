/// BSV transactions for the split engine.
///
/// Provides the Transaction type with its wire codec and txid, the
/// BIP-143-style FORKID signature hash, and the P2PKH lock/unlock template.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;

mod error;
pub use error::TransactionError;
pub use transaction::Transaction;
pub use input::TransactionInput;
pub use output::TransactionOutput;
