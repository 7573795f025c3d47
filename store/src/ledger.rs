//! Guarded append policy over a tabular backend.
//!
//! The backing table is append-only, so its row count must never go down.
//! A remote sheet read can return a false-empty result; a naive
//! read-modify-write on top of that would overwrite the whole dataset.
//! [`SignatureLedger`] refuses such writes instead of risking them.
//!
//! Known race: two ledgers (or two processes) appending concurrently can
//! both pass the guards and interleave their read-modify-write cycles —
//! neither guard can see a concurrent sibling write. This is a best-effort
//! compare-and-append, not a transaction; acceptable for a low-throughput
//! sign-up form.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::{BackupSink, StoreError, TabularStore};
use pledge_types::Signature;

/// Outcome of a successful [`SignatureLedger::append`].
#[derive(Clone, Copy, Debug)]
pub struct AppendReceipt {
    /// Row count after the write (or the pre-write count if only the
    /// backup captured the row).
    pub row_count: u64,
    /// Whether the primary store write succeeded.
    pub primary_ok: bool,
    /// Whether the backup sink captured the row.
    pub backed_up: bool,
}

/// Append-only signature ledger with shrink and monotonicity guards.
///
/// The ledger does not deduplicate: appending the same signature twice
/// produces two rows. Callers deduplicate first (see
/// [`crate::DuplicateChecker`]).
pub struct SignatureLedger {
    store: Arc<dyn TabularStore>,
    backup: Option<Arc<dyn BackupSink>>,
    floor: u64,
    last_known: Mutex<Option<u64>>,
}

impl SignatureLedger {
    /// Wrap a backend with the guard policy. The shrink floor starts at 0
    /// (disabled); deployments over a pre-seeded store raise it with
    /// [`SignatureLedger::with_floor`].
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self {
            store,
            backup: None,
            floor: 0,
            last_known: Mutex::new(None),
        }
    }

    /// Refuse any write when the store reads back fewer than `floor` rows.
    pub fn with_floor(mut self, floor: u64) -> Self {
        self.floor = floor;
        self
    }

    /// Attach a backup sink, written before every primary write.
    pub fn with_backup(mut self, sink: Arc<dyn BackupSink>) -> Self {
        self.backup = Some(sink);
        self
    }

    /// The last row count this ledger observed after a successful write.
    pub fn last_known_count(&self) -> Option<u64> {
        *self.last_known.lock().expect("ledger lock poisoned")
    }

    /// Append one signature, enforcing the guard protocol:
    ///
    /// 1. **Shrink guard** — read the current row count; refuse if the
    ///    store is unreadable, below the configured floor, or below the
    ///    last known-good count.
    /// 2. Write the backup sink (failure is non-fatal while the primary
    ///    still succeeds).
    /// 3. Construct the updated dataset and apply the **monotonicity
    ///    guard** — refuse if it would hold fewer rows than step 1 saw.
    /// 4. Overwrite the primary table. If that fails but the backup
    ///    already captured the row, report success with
    ///    `primary_ok == false` instead of losing the signature.
    pub async fn append(&self, signature: &Signature) -> Result<AppendReceipt, StoreError> {
        let old_count = self.store.row_count().await?;
        if old_count < self.floor {
            return Err(StoreError::ShrinkGuard {
                found: old_count,
                expected: self.floor,
            });
        }
        if let Some(expected) = self.last_known_count() {
            if old_count < expected {
                return Err(StoreError::ShrinkGuard {
                    found: old_count,
                    expected,
                });
            }
        }

        let backed_up = match &self.backup {
            Some(sink) => match sink.record(signature).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "backup sink write failed");
                    false
                }
            },
            None => false,
        };

        let mut rows = self.store.read_all().await?;
        rows.push(signature.clone());
        let new_count = rows.len() as u64;
        if new_count < old_count {
            return Err(StoreError::MonotonicityViolation {
                old: old_count,
                new: new_count,
            });
        }

        match self.store.overwrite_all(&rows).await {
            Ok(()) => {
                *self.last_known.lock().expect("ledger lock poisoned") = Some(new_count);
                Ok(AppendReceipt {
                    row_count: new_count,
                    primary_ok: true,
                    backed_up,
                })
            }
            Err(e) if backed_up => {
                warn!(error = %e, "primary store write failed; signature preserved in backup");
                Ok(AppendReceipt {
                    row_count: old_count,
                    primary_ok: false,
                    backed_up: true,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakySink, MemStore, RecordingSink};
    use pledge_types::{DistrictCode, Representative, Signature, Timestamp};

    fn sig(n: u32) -> Signature {
        Signature::new(
            Timestamp::new(1_000 + n as u64),
            format!("Signer {n}"),
            &format!("signer{n}@example.com"),
            DistrictCode::new("NY", 14),
            Representative::new("Jane Doe"),
        )
    }

    #[tokio::test]
    async fn append_grows_the_store_by_one() {
        let store = Arc::new(MemStore::default());
        let ledger = SignatureLedger::new(store.clone());

        let receipt = ledger.append(&sig(1)).await.unwrap();
        assert_eq!(receipt.row_count, 1);
        assert!(receipt.primary_ok);

        let receipt = ledger.append(&sig(2)).await.unwrap();
        assert_eq!(receipt.row_count, 2);
        assert_eq!(store.read_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn floor_refuses_writes_on_an_implausibly_small_store() {
        let store = Arc::new(MemStore::default());
        store.seed(vec![sig(1), sig(2)]);
        let ledger = SignatureLedger::new(store.clone()).with_floor(50);

        let err = ledger.append(&sig(3)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ShrinkGuard {
                found: 2,
                expected: 50
            }
        ));
        // the intended row was available but must not have been written
        assert_eq!(store.read_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_floor_admits_a_fresh_store() {
        let store = Arc::new(MemStore::default());
        let ledger = SignatureLedger::new(store);
        assert!(ledger.append(&sig(1)).await.is_ok());
    }

    #[tokio::test]
    async fn shrink_below_last_known_count_is_refused() {
        let store = Arc::new(MemStore::default());
        let ledger = SignatureLedger::new(store.clone());

        ledger.append(&sig(1)).await.unwrap();
        ledger.append(&sig(2)).await.unwrap();

        // simulate a false-empty read from the backend
        store.seed(Vec::new());
        let err = ledger.append(&sig(3)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ShrinkGuard {
                found: 0,
                expected: 2
            }
        ));
    }

    #[tokio::test]
    async fn unreadable_store_refuses_the_write() {
        let store = Arc::new(MemStore::default());
        store.fail_reads(true);
        let ledger = SignatureLedger::new(store);
        assert!(matches!(
            ledger.append(&sig(1)).await,
            Err(StoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn count_and_read_divergence_trips_the_monotonicity_guard() {
        let store = Arc::new(MemStore::default());
        store.seed(vec![sig(1), sig(2), sig(3)]);
        // count endpoint says 5, full read returns 3 — the updated dataset
        // of 4 rows would shrink the table
        store.report_count(Some(5));
        let ledger = SignatureLedger::new(store);

        let err = ledger.append(&sig(4)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::MonotonicityViolation { old: 5, new: 4 }
        ));
    }

    #[tokio::test]
    async fn primary_failure_after_backup_still_reports_success() {
        let store = Arc::new(MemStore::default());
        store.fail_writes(true);
        let sink = Arc::new(RecordingSink::default());
        let ledger = SignatureLedger::new(store).with_backup(sink.clone());

        let receipt = ledger.append(&sig(1)).await.unwrap();
        assert!(!receipt.primary_ok);
        assert!(receipt.backed_up);
        assert_eq!(sink.recorded().len(), 1);
    }

    #[tokio::test]
    async fn primary_failure_without_backup_is_an_error() {
        let store = Arc::new(MemStore::default());
        store.fail_writes(true);
        let ledger = SignatureLedger::new(store);
        assert!(ledger.append(&sig(1)).await.is_err());
    }

    #[tokio::test]
    async fn backup_failure_alone_does_not_block_the_append() {
        let store = Arc::new(MemStore::default());
        let ledger = SignatureLedger::new(store.clone()).with_backup(Arc::new(FlakySink));

        let receipt = ledger.append(&sig(1)).await.unwrap();
        assert!(receipt.primary_ok);
        assert!(!receipt.backed_up);
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_deduplication_in_the_ledger_itself() {
        let store = Arc::new(MemStore::default());
        let ledger = SignatureLedger::new(store.clone());
        ledger.append(&sig(1)).await.unwrap();
        ledger.append(&sig(1)).await.unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 2);
    }
}
