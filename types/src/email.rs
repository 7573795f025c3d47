//! Normalized email address type.
//!
//! The normalized form (trimmed, lower-cased) is the sole deduplication key
//! for signatures, so normalization lives in the constructor — an `Email`
//! value is always already normalized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An email address in normalized form: surrounding whitespace stripped,
/// all characters lower-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Normalize a raw user-entered address. Never fails; plausibility is
    /// a separate check ([`Email::is_plausible`]).
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Return the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lightweight shape check: non-empty and contains an `@`.
    ///
    /// Not an RFC 5322 validation; deliverability is proven by the
    /// verification code, not by syntax.
    pub fn is_plausible(&self) -> bool {
        !self.0.is_empty() && self.0.contains('@')
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
