use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("shrink guard: found {found} rows where at least {expected} were expected")]
    ShrinkGuard { found: u64, expected: u64 },

    #[error("monotonicity violation: write would take the store from {old} to {new} rows")]
    MonotonicityViolation { old: u64, new: u64 },
}
