//! The signature record — one confirmed pledge.

use crate::{DistrictCode, Email, Representative, Timestamp};
use serde::{Deserialize, Serialize};

/// One confirmed pledge, as persisted in the signature store.
///
/// The normalized email is the sole deduplication key: for any two
/// signatures in a store, their emails differ. The store is append-only;
/// rows are never updated or deleted in normal operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Commit instant, set once at append time.
    pub timestamp: Timestamp,
    /// Free-text display name.
    pub name: String,
    /// Normalized email address (the dedup key).
    pub email: Email,
    /// Resolved or manually entered district code.
    pub district: DistrictCode,
    /// District's current representative, or the vacant sentinel.
    pub representative: Representative,
}

impl Signature {
    /// Column order used by every tabular backend.
    pub const COLUMNS: [&'static str; 5] = ["Timestamp", "Name", "Email", "District", "Rep"];

    /// Build a signature, normalizing the email.
    pub fn new(
        timestamp: Timestamp,
        name: impl Into<String>,
        email: &str,
        district: DistrictCode,
        representative: Representative,
    ) -> Self {
        Self {
            timestamp,
            name: name.into(),
            email: Email::normalize(email),
            district,
            representative,
        }
    }
}
