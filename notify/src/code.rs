//! The 4-digit verification code.

use rand::Rng;
use std::fmt;

/// A 4-digit numeric verification code in 1000..=9999.
///
/// Uniform but not cryptographically secure; the code gates a petition
/// signature, not an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationCode(u16);

impl VerificationCode {
    pub const MIN: u16 = 1000;
    pub const MAX: u16 = 9999;

    /// Wrap a raw code value.
    ///
    /// # Panics
    /// Panics outside 1000..=9999.
    pub fn new(raw: u16) -> Self {
        assert!(
            (Self::MIN..=Self::MAX).contains(&raw),
            "verification code must be 4 digits"
        );
        Self(raw)
    }

    /// Compare against user-entered text. Surrounding whitespace is
    /// forgiven; anything else must match digit-for-digit.
    pub fn matches(&self, input: &str) -> bool {
        input.trim() == self.0.to_string()
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh verification codes, injectable for deterministic tests.
pub trait CodeSource: Send + Sync {
    fn next_code(&self) -> VerificationCode;
}

/// Production source drawing uniformly from the thread RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngCodeSource;

impl CodeSource for ThreadRngCodeSource {
    fn next_code(&self) -> VerificationCode {
        VerificationCode(rand::thread_rng().gen_range(VerificationCode::MIN..=VerificationCode::MAX))
    }
}
