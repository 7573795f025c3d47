//! The tabular storage trait.

use crate::StoreError;
use async_trait::async_trait;
use pledge_types::Signature;

/// A sheet-like table of signatures supporting whole-table read and
/// whole-table overwrite.
///
/// Column order is fixed ([`Signature::COLUMNS`]). Backends with a cheap
/// native append or row count override the default methods.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Read every row in the table.
    async fn read_all(&self) -> Result<Vec<Signature>, StoreError>;

    /// Replace the entire table with `rows`.
    async fn overwrite_all(&self, rows: &[Signature]) -> Result<(), StoreError>;

    /// Current number of rows.
    async fn row_count(&self) -> Result<u64, StoreError> {
        Ok(self.read_all().await?.len() as u64)
    }

    /// Append one row. The default is a read-modify-write through
    /// [`TabularStore::overwrite_all`]; append-friendly backends (a local
    /// delimited file) override it with a true append.
    async fn append_row(&self, row: &Signature) -> Result<(), StoreError> {
        let mut rows = self.read_all().await?;
        rows.push(row.clone());
        self.overwrite_all(&rows).await
    }
}
