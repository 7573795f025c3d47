//! Secondary persistence path for committed signatures.

use crate::StoreError;
use async_trait::async_trait;
use pledge_types::Signature;

/// An independent sink written before every primary store write, so a
/// signature survives even if the primary store is unreachable.
#[async_trait]
pub trait BackupSink: Send + Sync {
    /// Record one signature. Implementations append; they never rewrite.
    async fn record(&self, signature: &Signature) -> Result<(), StoreError>;
}
