//! Notification error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("smtp transport misconfigured: {0}")]
    Transport(String),

    #[error("message could not be built: {0}")]
    Message(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}
