//! Append-only CSV backup sink.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::CsvStore;
use pledge_store::{BackupSink, StoreError, TabularStore};
use pledge_types::Signature;

/// Backup sink appending to an independent CSV file.
///
/// Always a true append — the backup path never rewrites the file, so it
/// cannot exhibit the shrink failure mode it exists to protect against.
pub struct CsvBackup {
    store: CsvStore,
}

impl CsvBackup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: CsvStore::new(path),
        }
    }
}

#[async_trait]
impl BackupSink for CsvBackup {
    async fn record(&self, signature: &Signature) -> Result<(), StoreError> {
        self.store.append_row(signature).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledge_types::{DistrictCode, Representative, Timestamp};

    #[tokio::test]
    async fn records_accumulate_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.csv");
        let sink = CsvBackup::new(&path);

        for n in 1..=3u32 {
            let sig = Signature::new(
                Timestamp::new(n as u64),
                format!("Signer {n}"),
                &format!("signer{n}@example.com"),
                DistrictCode::new("NY", 14),
                Representative::vacant(),
            );
            sink.record(&sig).await.unwrap();
        }

        let rows = CsvStore::new(&path).read_all().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].email.as_str(), "signer3@example.com");
    }
}
