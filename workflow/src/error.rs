//! Workflow error types.
//!
//! Every variant except `Store` and `Internal` is a user-recoverable
//! condition: the session stays on its current step and the message is
//! shown to the signer.

use thiserror::Error;

use crate::session::Step;
use pledge_store::StoreError;
use pledge_types::Email;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("action not valid in step {actual} (expected {expected})")]
    WrongStep { expected: Step, actual: Step },

    #[error("no address found, please try again")]
    NoAddressMatches,

    #[error("no such address candidate: {0}")]
    NoSuchCandidate(usize),

    #[error("district not found")]
    DistrictNotFound,

    #[error("invalid district: {0}")]
    InvalidDistrict(String),

    #[error("name is required")]
    MissingName,

    #[error("invalid email: {0:?}")]
    InvalidEmail(String),

    #[error("'{0}' has already signed")]
    AlreadySigned(Email),

    #[error("verification email could not be sent, please try again")]
    CodeDelivery,

    #[error("incorrect code")]
    CodeMismatch,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal state error: {0}")]
    Internal(String),
}
