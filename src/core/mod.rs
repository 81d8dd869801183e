pub mod block;
pub mod iter;
pub mod script;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod transaction;

pub use block::{Block, BlockHash};
pub use iter::{RandomAccess, RecordIter};
pub use script::{ScriptPubkey, ScriptPubkeyExt, ScriptPubkeyRef};
pub use transaction::{Transaction, TransactionExt, TransactionRef, TxOut, TxOutExt, TxOutRef, Txid};
