//! Nullable notifier — records codes instead of emailing them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use pledge_notify::{Notifier, NotifyError, VerificationCode};
use pledge_types::Email;

/// A notifier that records every delivery instead of sending it.
#[derive(Default)]
pub struct NullNotifier {
    sent: Mutex<Vec<(Email, VerificationCode)>>,
    fail: AtomicBool,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// All deliveries "sent" so far (for assertions).
    pub fn sent(&self) -> Vec<(Email, VerificationCode)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for NullNotifier {
    async fn send_code(&self, to: &Email, code: VerificationCode) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery("scripted outage".into()));
        }
        self.sent.lock().unwrap().push((to.clone(), code));
        Ok(())
    }
}
