//! In-crate test doubles for the guard and dedup tests.
//!
//! The reusable doubles live in `pledge-nullables`; these stay private to
//! avoid a dev-dependency cycle (`pledge-nullables` depends on this crate).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pledge_types::Signature;

use crate::{BackupSink, StoreError, TabularStore};

/// In-memory tabular store with injectable failures and a spoofable
/// row-count report.
#[derive(Default)]
pub struct MemStore {
    rows: Mutex<Vec<Signature>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reported_count: Mutex<Option<u64>>,
}

impl MemStore {
    pub fn seed(&self, rows: Vec<Signature>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `row_count` report a fixed value regardless of the rows held.
    pub fn report_count(&self, count: Option<u64>) {
        *self.reported_count.lock().unwrap() = count;
    }
}

#[async_trait]
impl TabularStore for MemStore {
    async fn read_all(&self) -> Result<Vec<Signature>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".into()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn overwrite_all(&self, rows: &[Signature]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        *self.rows.lock().unwrap() = rows.to_vec();
        Ok(())
    }

    async fn row_count(&self) -> Result<u64, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".into()));
        }
        if let Some(count) = *self.reported_count.lock().unwrap() {
            return Ok(count);
        }
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

/// Backup sink that records every signature it is handed.
#[derive(Default)]
pub struct RecordingSink {
    recorded: Mutex<Vec<Signature>>,
}

impl RecordingSink {
    pub fn recorded(&self) -> Vec<Signature> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackupSink for RecordingSink {
    async fn record(&self, signature: &Signature) -> Result<(), StoreError> {
        self.recorded.lock().unwrap().push(signature.clone());
        Ok(())
    }
}

/// Backup sink that always fails.
pub struct FlakySink;

#[async_trait]
impl BackupSink for FlakySink {
    async fn record(&self, _signature: &Signature) -> Result<(), StoreError> {
        Err(StoreError::Backend("injected sink failure".into()))
    }
}
