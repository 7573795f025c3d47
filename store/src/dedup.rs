//! Duplicate detection over the signature store.

use std::sync::Arc;

use tracing::warn;

use crate::{StoreError, TabularStore};
use pledge_types::Email;

/// Checks whether a normalized email already appears in the store.
///
/// The verified-email sign-up path calls this twice: once before issuing a
/// code (cheap early rejection) and once again immediately before commit,
/// closing the window where two sessions verify the same email
/// concurrently.
pub struct DuplicateChecker {
    store: Arc<dyn TabularStore>,
}

impl DuplicateChecker {
    pub fn new(store: Arc<dyn TabularStore>) -> Self {
        Self { store }
    }

    /// Membership check with the read failure surfaced to the caller.
    ///
    /// Stored emails are re-normalized before comparison so rows edited
    /// out-of-band (a hand-touched worksheet) still match.
    pub async fn try_is_duplicate(&self, email: &Email) -> Result<bool, StoreError> {
        let needle = Email::normalize(email.as_str());
        let rows = self.store.read_all().await?;
        Ok(rows
            .iter()
            .any(|row| Email::normalize(row.email.as_str()) == needle))
    }

    /// Permissive membership check: a failed store read resolves to
    /// "not a duplicate".
    ///
    /// Availability over consistency — a storage transient must not block
    /// sign-ups, at the cost of rare duplicate admission under failure.
    pub async fn is_duplicate(&self, email: &Email) -> bool {
        match self.try_is_duplicate(email).await {
            Ok(dup) => dup,
            Err(e) => {
                warn!(error = %e, "duplicate check degraded to not-duplicate");
                false
            }
        }
    }
}
