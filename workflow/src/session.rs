//! Per-session state.

use std::fmt;

use serde::Serialize;

use crate::WorkflowError;
use pledge_geocode::AddressCandidate;
use pledge_notify::VerificationCode;
use pledge_types::{DistrictCode, Email, Representative, Signature};

/// Position in the sign-up flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Entering and confirming a street address (or a manual district).
    AddressEntry,
    /// District resolved; collecting name and email.
    DistrictConfirmed,
    /// Verification code issued; awaiting confirmation.
    AwaitingCode,
    /// Signature committed. Terminal except for a full restart.
    Complete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AddressEntry => "address_entry",
            Step::DistrictConfirmed => "district_confirmed",
            Step::AwaitingCode => "awaiting_code",
            Step::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// The identity captured at code-issuance time and used at commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingIdentity {
    pub name: String,
    /// Already normalized.
    pub email: Email,
}

/// Ephemeral state for one in-progress signer.
///
/// Owned exclusively by the active signing session; discarded on
/// completion or restart. Never persisted.
#[derive(Debug)]
pub struct PledgeSession {
    pub(crate) step: Step,
    pub(crate) candidates: Vec<AddressCandidate>,
    pub(crate) district: Option<DistrictCode>,
    pub(crate) representative: Option<Representative>,
    pub(crate) pending_code: Option<VerificationCode>,
    pub(crate) pending_identity: Option<PendingIdentity>,
    pub(crate) committed: Option<Signature>,
}

impl PledgeSession {
    pub fn new() -> Self {
        Self {
            step: Step::AddressEntry,
            candidates: Vec::new(),
            district: None,
            representative: None,
            pending_code: None,
            pending_identity: None,
            committed: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Candidates from the most recent address search.
    pub fn candidates(&self) -> &[AddressCandidate] {
        &self.candidates
    }

    pub fn district(&self) -> Option<&DistrictCode> {
        self.district.as_ref()
    }

    pub fn representative(&self) -> Option<&Representative> {
        self.representative.as_ref()
    }

    /// Where the verification code was sent, while one is outstanding.
    pub fn pending_email(&self) -> Option<&Email> {
        self.pending_identity.as_ref().map(|id| &id.email)
    }

    /// The committed signature once the flow completes.
    pub fn committed(&self) -> Option<&Signature> {
        self.committed.as_ref()
    }

    pub(crate) fn expect_step(&self, expected: Step) -> Result<(), WorkflowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Wipe everything back to a fresh `AddressEntry`.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for PledgeSession {
    fn default() -> Self {
        Self::new()
    }
}
