//! The workflow engine — wires the session state machine to its
//! collaborators and enforces step ordering and validation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::session::{PendingIdentity, PledgeSession, Step};
use crate::WorkflowError;
use pledge_geocode::{AddressCandidate, DistrictResolution, Geocoder};
use pledge_notify::{issue_code, CodeSource, Notifier};
use pledge_store::{DuplicateChecker, SignatureLedger};
use pledge_types::{Clock, DistrictCode, Email, Representative, Signature};

/// The code-challenge collaborators. Absent in the simpler workflow
/// variant, where a validated identity commits immediately.
pub struct CodeChallenge {
    pub notifier: Arc<dyn Notifier>,
    pub codes: Arc<dyn CodeSource>,
}

/// Result of a valid identity submission.
#[derive(Debug)]
pub enum IdentityOutcome {
    /// A verification code was emailed; the session awaits it.
    CodeSent,
    /// No code challenge is configured; the signature committed directly.
    Committed(Signature),
}

/// Drives [`PledgeSession`] transitions. One engine is shared by every
/// session; all per-signer state lives in the session object.
pub struct PledgeWorkflow {
    geocoder: Arc<dyn Geocoder>,
    checker: DuplicateChecker,
    ledger: SignatureLedger,
    clock: Arc<dyn Clock>,
    code_challenge: Option<CodeChallenge>,
}

impl PledgeWorkflow {
    /// Build the simpler variant: no code challenge, identity submission
    /// commits directly.
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        checker: DuplicateChecker,
        ledger: SignatureLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            geocoder,
            checker,
            ledger,
            clock,
            code_challenge: None,
        }
    }

    /// Enable the canonical verified-email variant.
    pub fn with_code_challenge(
        mut self,
        notifier: Arc<dyn Notifier>,
        codes: Arc<dyn CodeSource>,
    ) -> Self {
        self.code_challenge = Some(CodeChallenge { notifier, codes });
        self
    }

    /// Step 1a: search for candidate addresses.
    ///
    /// A failed or empty search keeps the session on `AddressEntry` with
    /// [`WorkflowError::NoAddressMatches`] — the signer cannot tell an
    /// unreachable service from an unmatched address, and does not need to.
    pub async fn search_address(
        &self,
        session: &mut PledgeSession,
        query: &str,
    ) -> Result<Vec<AddressCandidate>, WorkflowError> {
        session.expect_step(Step::AddressEntry)?;
        session.candidates.clear();

        let candidates = match self.geocoder.search_addresses(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "address search failed, treating as no matches");
                Vec::new()
            }
        };
        if candidates.is_empty() {
            return Err(WorkflowError::NoAddressMatches);
        }
        session.candidates = candidates.clone();
        Ok(candidates)
    }

    /// Step 1b: confirm one candidate and resolve its district.
    pub async fn confirm_address(
        &self,
        session: &mut PledgeSession,
        index: usize,
    ) -> Result<DistrictResolution, WorkflowError> {
        session.expect_step(Step::AddressEntry)?;
        let candidate = session
            .candidates
            .get(index)
            .ok_or(WorkflowError::NoSuchCandidate(index))?
            .clone();

        let resolution = match self.geocoder.resolve_district(&candidate.display_name).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(error = %e, address = %candidate.display_name, "district resolution failed");
                return Err(WorkflowError::DistrictNotFound);
            }
        };

        session.district = Some(resolution.district.clone());
        session.representative = Some(resolution.representative.clone());
        session.step = Step::DistrictConfirmed;
        Ok(resolution)
    }

    /// Step 1 alternative: type the district directly instead of looking
    /// it up. A blank representative records the seat as vacant.
    pub fn enter_district_manually(
        &self,
        session: &mut PledgeSession,
        district: &str,
        representative: &str,
    ) -> Result<DistrictResolution, WorkflowError> {
        session.expect_step(Step::AddressEntry)?;
        let district = DistrictCode::parse(district)
            .map_err(|e| WorkflowError::InvalidDistrict(e.to_string()))?;
        let representative = Representative::new(representative);

        session.district = Some(district.clone());
        session.representative = Some(representative.clone());
        session.step = Step::DistrictConfirmed;
        Ok(DistrictResolution {
            district,
            representative,
        })
    }

    /// Step 2: submit name and email.
    ///
    /// Valid input either issues a verification code (canonical variant)
    /// or commits the signature directly (no code challenge configured).
    pub async fn submit_identity(
        &self,
        session: &mut PledgeSession,
        name: &str,
        email: &str,
    ) -> Result<IdentityOutcome, WorkflowError> {
        session.expect_step(Step::DistrictConfirmed)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(WorkflowError::MissingName);
        }
        let normalized = Email::normalize(email);
        if !normalized.is_plausible() {
            return Err(WorkflowError::InvalidEmail(email.trim().to_string()));
        }

        // cheap early rejection before bothering the mail relay
        if self.checker.is_duplicate(&normalized).await {
            return Err(WorkflowError::AlreadySigned(normalized));
        }

        match &self.code_challenge {
            Some(challenge) => {
                let code =
                    issue_code(challenge.notifier.as_ref(), challenge.codes.as_ref(), &normalized)
                        .await
                        .ok_or(WorkflowError::CodeDelivery)?;
                session.pending_code = Some(code);
                session.pending_identity = Some(PendingIdentity {
                    name: name.to_string(),
                    email: normalized,
                });
                session.step = Step::AwaitingCode;
                Ok(IdentityOutcome::CodeSent)
            }
            None => {
                let signature = self.commit(session, name.to_string(), normalized).await?;
                Ok(IdentityOutcome::Committed(signature))
            }
        }
    }

    /// Step 3: confirm the emailed code and commit.
    ///
    /// A mismatch keeps the pending code so the signer can retry. A match
    /// re-checks for duplicates before writing: real time passed while the
    /// code sat in an inbox, and another session may have signed with the
    /// same email in that window.
    pub async fn submit_code(
        &self,
        session: &mut PledgeSession,
        input: &str,
    ) -> Result<Signature, WorkflowError> {
        session.expect_step(Step::AwaitingCode)?;
        let code = session
            .pending_code
            .ok_or_else(|| WorkflowError::Internal("awaiting code with no pending code".into()))?;
        if !code.matches(input) {
            return Err(WorkflowError::CodeMismatch);
        }
        let identity = session
            .pending_identity
            .clone()
            .ok_or_else(|| WorkflowError::Internal("awaiting code with no identity".into()))?;

        if self.checker.is_duplicate(&identity.email).await {
            let email = identity.email;
            session.clear();
            return Err(WorkflowError::AlreadySigned(email));
        }

        self.commit(session, identity.name, identity.email).await
    }

    /// The district was wrong — back to address entry.
    pub fn wrong_district(&self, session: &mut PledgeSession) -> Result<(), WorkflowError> {
        session.expect_step(Step::DistrictConfirmed)?;
        session.candidates.clear();
        session.district = None;
        session.representative = None;
        session.step = Step::AddressEntry;
        Ok(())
    }

    /// Full restart from any step. Clears all session state.
    pub fn restart(&self, session: &mut PledgeSession) {
        session.clear();
    }

    async fn commit(
        &self,
        session: &mut PledgeSession,
        name: String,
        email: Email,
    ) -> Result<Signature, WorkflowError> {
        let (district, representative) = match (&session.district, &session.representative) {
            (Some(d), Some(r)) => (d.clone(), r.clone()),
            _ => {
                return Err(WorkflowError::Internal(
                    "commit without a confirmed district".into(),
                ))
            }
        };

        let signature = Signature {
            timestamp: self.clock.now(),
            name,
            email,
            district,
            representative,
        };
        let receipt = self.ledger.append(&signature).await?;
        info!(
            email = %signature.email,
            district = %signature.district,
            rows = receipt.row_count,
            primary_ok = receipt.primary_ok,
            "signature committed"
        );

        session.pending_code = None;
        session.pending_identity = None;
        session.committed = Some(signature.clone());
        session.step = Step::Complete;
        Ok(signature)
    }
}
