/// BSV script handling for the split engine.
///
/// Provides the Script byte type, push-data chunk parsing, the opcodes used
/// by P2PKH templates, and Base58Check P2PKH addresses.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod address;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use address::{Address, Network};
pub use chunk::ScriptChunk;
