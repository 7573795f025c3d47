//! CSV-file tabular store.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::row::Row;
use pledge_store::{StoreError, TabularStore};
use pledge_types::Signature;

/// Signature store backed by a local CSV file.
///
/// A missing file reads as an empty table (fresh start). The header row is
/// written on first write. `overwrite_all` rewrites through a sibling temp
/// file and renames it into place so a crash mid-write cannot leave a
/// truncated table behind.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Administrative: delete the backing file entirely. Not reachable
    /// from the sign-up workflow.
    pub fn reset(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| StoreError::Backend(e.to_string()))?;
            debug!(path = %self.path.display(), "signature file removed");
        }
        Ok(())
    }

    fn read_rows(&self) -> Result<Vec<Signature>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<Row>() {
            let row = record.map_err(|e| StoreError::Serialization(e.to_string()))?;
            rows.push(row.into_signature()?);
        }
        Ok(rows)
    }

    fn write_rows(&self, rows: &[Signature]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            writer
                .write_record(Signature::COLUMNS)
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            for sig in rows {
                writer
                    .serialize(Row::from(sig))
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
            }
            writer
                .flush()
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn append_one(&self, sig: &Signature) -> Result<(), StoreError> {
        if !self.path.exists() {
            return self.write_rows(std::slice::from_ref(sig));
        }
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(Row::from(sig))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl TabularStore for CsvStore {
    async fn read_all(&self) -> Result<Vec<Signature>, StoreError> {
        self.read_rows()
    }

    async fn overwrite_all(&self, rows: &[Signature]) -> Result<(), StoreError> {
        self.write_rows(rows)
    }

    async fn append_row(&self, row: &Signature) -> Result<(), StoreError> {
        self.append_one(row)
    }
}
