/// Validated UTXO-split transactions for BSV.
///
/// Takes claimed spendable outputs together with the raw bytes of the
/// transactions that created them, proves every claim against those bytes,
/// and only then builds and signs a transaction that splits the value into
/// equal outputs plus optional change.
///
/// Pipeline, leaves first:
/// - [`validator`]: txid, vout and amount checks against source bytes
/// - [`fee`]: linear P2PKH size and fee model
/// - [`recipient`]: fixed or BIP-32 derived destinations
/// - [`assembler`]: totals, change and the unsigned transaction
/// - [`signer`]: FORKID signatures for every input
/// - [`reconciler`]: actual size, fee and the result report
///
/// [`SplitBuilder`] drives the stages as a forward-only state machine.

pub mod assembler;
pub mod builder;
pub mod fee;
pub mod policy;
pub mod recipient;
pub mod reconciler;
pub mod signer;
pub mod types;
pub mod validator;

mod error;
pub use builder::{BuildStage, BuildState, SplitBuilder};
pub use error::{ErrorKind, SplitError};
pub use policy::SplitPolicy;
pub use types::{
    Recipient, ResultInput, ResultOutput, SplitConfig, TransactionResult, Utxo, ValidatedUtxo,
};
