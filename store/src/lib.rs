//! Abstract signature storage for the pledge service.
//!
//! Every tabular backend (local CSV file, remote worksheet, in-memory for
//! testing) implements [`TabularStore`]. The rest of the codebase depends
//! only on the trait; the data-integrity guards live in
//! [`SignatureLedger`], which wraps any backend.

pub mod backup;
pub mod dedup;
pub mod error;
pub mod ledger;
pub mod tabular;

#[cfg(test)]
pub(crate) mod testing;

pub use backup::BackupSink;
pub use dedup::DuplicateChecker;
pub use error::StoreError;
pub use ledger::{AppendReceipt, SignatureLedger};
pub use tabular::TabularStore;
