//! The pledge sign-up workflow.
//!
//! A four-step state machine drives each signer:
//!
//! ```text
//! AddressEntry → DistrictConfirmed → AwaitingCode → Complete
//! ```
//!
//! with a manual-entry variant that reaches `DistrictConfirmed` by typing
//! the district directly. Session state is an explicit object owned by the
//! caller and passed through every transition — no ambient global.
//!
//! The verified-email path checks for duplicates twice: before issuing a
//! code and again immediately before commit. Between those two points the
//! user is off reading their inbox, and another session can sign with the
//! same email in that window.

pub mod engine;
pub mod error;
pub mod session;

pub use engine::{CodeChallenge, IdentityOutcome, PledgeWorkflow};
pub use error::WorkflowError;
pub use session::{PendingIdentity, PledgeSession, Step};
