//! Nullable storage — thread-safe in-memory signature table and backup
//! sink for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use pledge_store::{BackupSink, StoreError, TabularStore};
use pledge_types::Signature;

/// An in-memory signature table with injectable failures.
///
/// `report_count` decouples the advertised row count from the rows
/// actually held, reproducing a backend whose count endpoint disagrees
/// with a full read.
#[derive(Default)]
pub struct NullStore {
    rows: Mutex<Vec<Signature>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reported_count: Mutex<Option<u64>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table contents outside the store protocol.
    pub fn seed(&self, rows: Vec<Signature>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Pin the advertised row count, independent of the rows held.
    pub fn report_count(&self, count: Option<u64>) {
        *self.reported_count.lock().unwrap() = count;
    }

    /// Current rows (for assertions).
    pub fn rows(&self) -> Vec<Signature> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl TabularStore for NullStore {
    async fn read_all(&self) -> Result<Vec<Signature>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted read outage".into()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn overwrite_all(&self, rows: &[Signature]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted write outage".into()));
        }
        *self.rows.lock().unwrap() = rows.to_vec();
        Ok(())
    }

    async fn row_count(&self) -> Result<u64, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted read outage".into()));
        }
        if let Some(count) = *self.reported_count.lock().unwrap() {
            return Ok(count);
        }
        Ok(self.rows.lock().unwrap().len() as u64)
    }
}

/// A backup sink that records signatures in memory.
#[derive(Default)]
pub struct NullSink {
    recorded: Mutex<Vec<Signature>>,
    fail: AtomicBool,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_records(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Everything captured so far (for assertions).
    pub fn recorded(&self) -> Vec<Signature> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackupSink for NullSink {
    async fn record(&self, signature: &Signature) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("scripted sink outage".into()));
        }
        self.recorded.lock().unwrap().push(signature.clone());
        Ok(())
    }
}
