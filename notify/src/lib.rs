//! Verification code generation and delivery.
//!
//! The code is lightweight anti-bot friction, not an authentication
//! credential: 4 digits, uniform, delivered over email. Delivery success
//! does not guarantee receipt — there is no bounce handling.

pub mod code;
pub mod error;
pub mod smtp;

pub use code::{CodeSource, ThreadRngCodeSource, VerificationCode};
pub use error::NotifyError;
pub use smtp::{SmtpConfig, SmtpNotifier};

use async_trait::async_trait;
use tracing::warn;

use pledge_types::Email;

/// The delivery seam the workflow drives.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a verification code to `to`.
    async fn send_code(&self, to: &Email, code: VerificationCode) -> Result<(), NotifyError>;
}

/// Generate a code and attempt delivery.
///
/// `None` means delivery failed; the caller surfaces a recoverable error
/// and stays on the same step so the user can retry.
pub async fn issue_code(
    notifier: &dyn Notifier,
    codes: &dyn CodeSource,
    to: &Email,
) -> Option<VerificationCode> {
    let code = codes.next_code();
    match notifier.send_code(to, code).await {
        Ok(()) => Some(code),
        Err(e) => {
            warn!(email = %to, error = %e, "verification code delivery failed");
            None
        }
    }
}
