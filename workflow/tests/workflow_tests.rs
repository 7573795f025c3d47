//! Integration tests exercising the full sign-up flow:
//! address search → district resolution → identity → code challenge →
//! guarded commit.
//!
//! These tests wire the workflow to its nullable collaborators, verifying
//! the state machine end-to-end — not just in isolation.

use std::sync::Arc;

use pledge_nullables::{NullClock, NullCodeSource, NullGeocoder, NullNotifier, NullSink, NullStore};
use pledge_store::{DuplicateChecker, SignatureLedger, StoreError};
use pledge_types::{Clock, DistrictCode, Email, Representative, Signature, Timestamp};
use pledge_workflow::{IdentityOutcome, PledgeSession, PledgeWorkflow, Step, WorkflowError};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    geocoder: Arc<NullGeocoder>,
    notifier: Arc<NullNotifier>,
    clock: Arc<NullClock>,
    store: Arc<NullStore>,
    sink: Arc<NullSink>,
    workflow: PledgeWorkflow,
}

const CODE: u16 = 4321;

/// Build the canonical verified-email workflow over nullable collaborators.
fn verified_harness() -> Harness {
    let geocoder = Arc::new(NullGeocoder::new());
    let notifier = Arc::new(NullNotifier::new());
    let clock = Arc::new(NullClock::new(1_754_000_000));
    let store = Arc::new(NullStore::new());
    let sink = Arc::new(NullSink::new());

    let ledger = SignatureLedger::new(store.clone()).with_backup(sink.clone());
    let checker = DuplicateChecker::new(store.clone());
    let workflow = PledgeWorkflow::new(geocoder.clone(), checker, ledger, clock.clone())
        .with_code_challenge(notifier.clone(), Arc::new(NullCodeSource::constant(CODE)));

    Harness {
        geocoder,
        notifier,
        clock,
        store,
        sink,
        workflow,
    }
}

fn script_springfield(geocoder: &NullGeocoder) {
    geocoder.on_search(
        "123 Main St, Springfield",
        &["123 Main St, Springfield, IL, USA"],
    );
    geocoder.on_resolve(
        "123 Main St, Springfield, IL, USA",
        DistrictCode::new("IL", 13),
        Representative::new("Jane Doe"),
    );
}

/// Drive a fresh session to `DistrictConfirmed` via the scripted address.
async fn confirm_springfield(h: &Harness, session: &mut PledgeSession) {
    script_springfield(&h.geocoder);
    let candidates = h
        .workflow
        .search_address(session, "123 Main St, Springfield")
        .await
        .expect("search should match");
    assert_eq!(candidates.len(), 1);
    h.workflow
        .confirm_address(session, 0)
        .await
        .expect("district should resolve");
}

fn seeded_signature(email: &str) -> Signature {
    Signature::new(
        Timestamp::new(1_700_000_000),
        "Earlier Signer",
        email,
        DistrictCode::new("NY", 14),
        Representative::vacant(),
    )
}

// ---------------------------------------------------------------------------
// 1. Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_verified_signup_commits_the_signature() {
    let h = verified_harness();
    let mut session = PledgeSession::new();

    confirm_springfield(&h, &mut session).await;
    assert_eq!(session.step(), Step::DistrictConfirmed);
    assert_eq!(session.district().unwrap().as_str(), "IL-13");
    assert_eq!(session.representative().unwrap().as_str(), "Jane Doe");

    let outcome = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", " Alex@Example.Com ")
        .await
        .expect("identity should be accepted");
    assert!(matches!(outcome, IdentityOutcome::CodeSent));
    assert_eq!(session.step(), Step::AwaitingCode);
    assert_eq!(session.pending_email().unwrap().as_str(), "alex@example.com");

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.as_str(), "alex@example.com");

    let signature = h
        .workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .expect("correct code should commit");
    assert_eq!(session.step(), Step::Complete);
    assert_eq!(signature.name, "Alex Lee");
    assert_eq!(signature.email.as_str(), "alex@example.com");
    assert_eq!(signature.district.as_str(), "IL-13");
    assert_eq!(signature.representative.as_str(), "Jane Doe");
    assert_eq!(signature.timestamp, h.clock.now());

    // row reached both the primary store and the backup sink
    assert_eq!(h.store.rows().len(), 1);
    assert_eq!(h.sink.recorded().len(), 1);
    assert_eq!(session.committed().unwrap(), &signature);
}

// ---------------------------------------------------------------------------
// 2. Address entry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unmatched_address_stays_on_address_entry() {
    let h = verified_harness();
    let mut session = PledgeSession::new();

    let err = h
        .workflow
        .search_address(&mut session, "nowhere at all")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoAddressMatches));
    assert_eq!(session.step(), Step::AddressEntry);
    assert!(session.candidates().is_empty());
}

#[tokio::test]
async fn search_outage_reads_as_no_matches() {
    let h = verified_harness();
    h.geocoder.fail_searches(true);
    let mut session = PledgeSession::new();

    let err = h
        .workflow
        .search_address(&mut session, "123 Main St, Springfield")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoAddressMatches));
    assert_eq!(session.step(), Step::AddressEntry);
}

#[tokio::test]
async fn a_new_search_clears_previous_candidates() {
    let h = verified_harness();
    script_springfield(&h.geocoder);
    let mut session = PledgeSession::new();

    h.workflow
        .search_address(&mut session, "123 Main St, Springfield")
        .await
        .unwrap();
    assert_eq!(session.candidates().len(), 1);

    let _ = h.workflow.search_address(&mut session, "unknown").await;
    assert!(session.candidates().is_empty());
}

#[tokio::test]
async fn unresolvable_district_keeps_the_candidates() {
    let h = verified_harness();
    h.geocoder
        .on_search("somewhere", &["Somewhere, Guam, USA"]);
    // no resolution scripted for the candidate
    let mut session = PledgeSession::new();

    h.workflow
        .search_address(&mut session, "somewhere")
        .await
        .unwrap();
    let err = h.workflow.confirm_address(&mut session, 0).await.unwrap_err();
    assert!(matches!(err, WorkflowError::DistrictNotFound));
    assert_eq!(session.step(), Step::AddressEntry);
    assert_eq!(session.candidates().len(), 1);
}

#[tokio::test]
async fn out_of_range_candidate_index_is_rejected() {
    let h = verified_harness();
    script_springfield(&h.geocoder);
    let mut session = PledgeSession::new();

    h.workflow
        .search_address(&mut session, "123 Main St, Springfield")
        .await
        .unwrap();
    let err = h.workflow.confirm_address(&mut session, 7).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NoSuchCandidate(7)));
}

#[tokio::test]
async fn manual_district_entry_skips_geocoding() {
    let h = verified_harness();
    let mut session = PledgeSession::new();

    let resolution = h
        .workflow
        .enter_district_manually(&mut session, "ny-14", "")
        .expect("manual entry should be accepted");
    assert_eq!(resolution.district.as_str(), "NY-14");
    assert!(resolution.representative.is_vacant());
    assert_eq!(session.step(), Step::DistrictConfirmed);
}

#[tokio::test]
async fn malformed_manual_district_is_rejected() {
    let h = verified_harness();
    let mut session = PledgeSession::new();

    let err = h
        .workflow
        .enter_district_manually(&mut session, "fourteen", "Jane Doe")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDistrict(_)));
    assert_eq!(session.step(), Step::AddressEntry);
}

// ---------------------------------------------------------------------------
// 3. Identity submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_name_and_bad_email_stay_on_district_confirmed() {
    let h = verified_harness();
    let mut session = PledgeSession::new();
    confirm_springfield(&h, &mut session).await;

    let err = h
        .workflow
        .submit_identity(&mut session, "   ", "alex@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::MissingName));

    let err = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "not-an-email")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidEmail(_)));

    assert_eq!(session.step(), Step::DistrictConfirmed);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_rejected_before_a_code_is_sent() {
    let h = verified_harness();
    h.store.seed(vec![seeded_signature("alex@example.com")]);
    let mut session = PledgeSession::new();
    confirm_springfield(&h, &mut session).await;

    let err = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "ALEX@Example.Com")
        .await
        .unwrap_err();
    match err {
        WorkflowError::AlreadySigned(email) => {
            assert_eq!(email.as_str(), "alex@example.com");
        }
        other => panic!("expected AlreadySigned, got {other:?}"),
    }
    assert_eq!(session.step(), Step::DistrictConfirmed);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn delivery_failure_keeps_the_session_retryable() {
    let h = verified_harness();
    h.notifier.fail_deliveries(true);
    let mut session = PledgeSession::new();
    confirm_springfield(&h, &mut session).await;

    let err = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CodeDelivery));
    assert_eq!(session.step(), Step::DistrictConfirmed);

    // the relay recovers; the same submission now goes through
    h.notifier.fail_deliveries(false);
    let outcome = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap();
    assert!(matches!(outcome, IdentityOutcome::CodeSent));
}

#[tokio::test]
async fn unreadable_store_does_not_block_signup() {
    // availability over consistency: a failed duplicate check lets the
    // sign-up proceed
    let h = verified_harness();
    h.store.seed(vec![seeded_signature("alex@example.com")]);
    h.store.fail_reads(true);
    let mut session = PledgeSession::new();

    h.workflow
        .enter_district_manually(&mut session, "IL-13", "Jane Doe")
        .unwrap();
    let outcome = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap();
    assert!(matches!(outcome, IdentityOutcome::CodeSent));
}

// ---------------------------------------------------------------------------
// 4. Code confirmation
// ---------------------------------------------------------------------------

async fn reach_awaiting_code(h: &Harness) -> PledgeSession {
    let mut session = PledgeSession::new();
    confirm_springfield(h, &mut session).await;
    h.workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn wrong_code_stays_and_writes_nothing() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;

    for wrong in ["0000", "9999", "432", "", "43214"] {
        let err = h.workflow.submit_code(&mut session, wrong).await.unwrap_err();
        assert!(matches!(err, WorkflowError::CodeMismatch), "input {wrong:?}");
        assert_eq!(session.step(), Step::AwaitingCode);
    }
    assert!(h.store.rows().is_empty());

    // the code survives mismatches: the correct one still commits
    h.workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .expect("retry with the right code");
    assert_eq!(h.store.rows().len(), 1);
}

#[tokio::test]
async fn race_guard_rejects_an_email_signed_while_waiting() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;

    // another session commits the same email while ours reads its inbox
    h.store.seed(vec![seeded_signature("alex@example.com")]);

    let err = h
        .workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadySigned(_)));
    // aborted, not completed; the session is back at a clean start
    assert_eq!(session.step(), Step::AddressEntry);
    assert_eq!(h.store.rows().len(), 1);
}

#[tokio::test]
async fn two_sessions_with_one_email_commit_at_most_once() {
    let h = verified_harness();
    let mut first = reach_awaiting_code(&h).await;

    let mut second = PledgeSession::new();
    h.workflow
        .enter_district_manually(&mut second, "IL-13", "Jane Doe")
        .unwrap();
    h.workflow
        .submit_identity(&mut second, "Also Alex", "alex@example.com")
        .await
        .expect("pre-check passes before either commits");

    h.workflow
        .submit_code(&mut first, &CODE.to_string())
        .await
        .expect("first confirmation wins");

    let err = h
        .workflow
        .submit_code(&mut second, &CODE.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadySigned(_)));
    assert_eq!(h.store.rows().len(), 1);
}

#[tokio::test]
async fn guard_abort_surfaces_as_a_store_error() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;

    h.store.fail_writes(true);
    h.sink.fail_records(true);
    let err = h
        .workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Store(StoreError::Backend(_))));
    assert_eq!(session.step(), Step::AwaitingCode);
}

#[tokio::test]
async fn primary_outage_with_backup_still_completes() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;

    h.store.fail_writes(true);
    let signature = h
        .workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .expect("backup sink carries the signature");
    assert_eq!(session.step(), Step::Complete);
    assert_eq!(h.sink.recorded(), vec![signature]);
    assert!(h.store.rows().is_empty());
}

// ---------------------------------------------------------------------------
// 5. Step ordering, wrong-district, restart
// ---------------------------------------------------------------------------

#[tokio::test]
async fn actions_out_of_order_are_rejected() {
    let h = verified_harness();
    let mut session = PledgeSession::new();

    let err = h
        .workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::WrongStep {
            expected: Step::DistrictConfirmed,
            actual: Step::AddressEntry,
        }
    ));

    let err = h.workflow.submit_code(&mut session, "4321").await.unwrap_err();
    assert!(matches!(err, WorkflowError::WrongStep { .. }));
}

#[tokio::test]
async fn wrong_district_returns_to_address_entry() {
    let h = verified_harness();
    let mut session = PledgeSession::new();
    confirm_springfield(&h, &mut session).await;

    h.workflow.wrong_district(&mut session).unwrap();
    assert_eq!(session.step(), Step::AddressEntry);
    assert!(session.district().is_none());
    assert!(session.representative().is_none());
    assert!(session.candidates().is_empty());
}

#[tokio::test]
async fn complete_is_terminal_until_restart() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;
    h.workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .unwrap();

    let err = h
        .workflow
        .search_address(&mut session, "123 Main St, Springfield")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::WrongStep { .. }));

    h.workflow.restart(&mut session);
    assert_eq!(session.step(), Step::AddressEntry);
    assert!(session.committed().is_none());
    assert!(session.pending_email().is_none());

    // the store keeps the committed row; restart only clears the session
    assert_eq!(h.store.rows().len(), 1);
}

// ---------------------------------------------------------------------------
// 6. Simpler variant: no code challenge
// ---------------------------------------------------------------------------

fn direct_harness() -> (PledgeWorkflow, Arc<NullStore>) {
    let geocoder = Arc::new(NullGeocoder::new());
    let clock = Arc::new(NullClock::new(1_754_000_000));
    let store = Arc::new(NullStore::new());
    let ledger = SignatureLedger::new(store.clone());
    let checker = DuplicateChecker::new(store.clone());
    let workflow = PledgeWorkflow::new(geocoder, checker, ledger, clock);
    (workflow, store)
}

#[tokio::test]
async fn direct_variant_commits_on_identity_submission() {
    let (workflow, store) = direct_harness();
    let mut session = PledgeSession::new();

    workflow
        .enter_district_manually(&mut session, "IL-13", "Jane Doe")
        .unwrap();
    let outcome = workflow
        .submit_identity(&mut session, "Alex Lee", "alex@example.com")
        .await
        .unwrap();
    match outcome {
        IdentityOutcome::Committed(signature) => {
            assert_eq!(signature.email.as_str(), "alex@example.com");
        }
        other => panic!("expected Committed, got {other:?}"),
    }
    assert_eq!(session.step(), Step::Complete);
    assert_eq!(store.rows().len(), 1);
}

#[tokio::test]
async fn direct_variant_still_rejects_duplicates() {
    let (workflow, store) = direct_harness();
    store.seed(vec![seeded_signature("alex@example.com")]);
    let mut session = PledgeSession::new();

    workflow
        .enter_district_manually(&mut session, "IL-13", "Jane Doe")
        .unwrap();
    let err = workflow
        .submit_identity(&mut session, "Alex Lee", " ALEX@example.com ")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadySigned(_)));
    assert_eq!(store.rows().len(), 1);
}

// ---------------------------------------------------------------------------
// 7. Store round-trip through the checker
// ---------------------------------------------------------------------------

#[tokio::test]
async fn a_committed_email_is_a_duplicate_on_the_next_read() {
    let h = verified_harness();
    let mut session = reach_awaiting_code(&h).await;
    h.workflow
        .submit_code(&mut session, &CODE.to_string())
        .await
        .unwrap();

    let checker = DuplicateChecker::new(h.store.clone());
    assert!(checker.is_duplicate(&Email::normalize(" ALEX@Example.Com ")).await);
}
