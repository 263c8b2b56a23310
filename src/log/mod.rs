//! Transaction log: the durable record of publish operations.
//!
//! Two log files share one line format: `server.txt` is the "current" view
//! keyed by transaction id, `history.txt` the append-only full history. Each
//! transaction additionally owns a side file in the admin directory, named by
//! its id, listing the published entries.

pub mod read;
pub mod record;

pub use read::{History, Transaction, TransactionEntry, Transactions};
pub use record::{TransactionKind, TransactionRecord, TransactionRef};
