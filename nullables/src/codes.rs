//! Nullable code source — pre-configured verification codes.

use std::sync::Mutex;

use pledge_notify::{CodeSource, VerificationCode};

/// A deterministic code source for testing.
///
/// Returns pre-configured codes in order, cycling when exhausted.
pub struct NullCodeSource {
    codes: Mutex<Vec<VerificationCode>>,
    index: Mutex<usize>,
}

impl NullCodeSource {
    /// Create with a sequence of codes to hand out.
    pub fn new(raw_codes: Vec<u16>) -> Self {
        Self {
            codes: Mutex::new(raw_codes.into_iter().map(VerificationCode::new).collect()),
            index: Mutex::new(0),
        }
    }

    /// Create with a single code returned on every call.
    pub fn constant(raw: u16) -> Self {
        Self::new(vec![raw])
    }
}

impl CodeSource for NullCodeSource {
    fn next_code(&self) -> VerificationCode {
        let codes = self.codes.lock().unwrap();
        let mut idx = self.index.lock().unwrap();
        let current = *idx % codes.len();
        *idx += 1;
        codes[current]
    }
}
