//! Request handlers and their wire types.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiError, AppState};
use pledge_store::TabularStore;
use pledge_types::Signature;
use pledge_workflow::{IdentityOutcome, PledgeSession, Step};

/// Exact phrase required in the body of a destructive admin reset.
pub const RESET_CONFIRM_PHRASE: &str = "DELETE ALL SIGNATURES";

/// Header carrying the admin shared secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub candidates: Vec<String>,
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    pub index: usize,
}

#[derive(Deserialize)]
pub struct ManualDistrictRequest {
    pub district: String,
    #[serde(default)]
    pub representative: String,
}

#[derive(Serialize)]
pub struct DistrictResponse {
    pub district: String,
    pub representative: String,
    pub step: Step,
}

#[derive(Deserialize)]
pub struct IdentityRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct IdentityResponse {
    pub step: Step,
    /// Present only in the no-code-challenge variant, where submission
    /// commits directly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBody>,
}

#[derive(Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Serialize)]
pub struct SignatureResponse {
    pub step: Step,
    pub signature: SignatureBody,
}

/// JSON rendering of a committed signature.
#[derive(Serialize)]
pub struct SignatureBody {
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub district: String,
    pub representative: String,
}

impl From<&Signature> for SignatureBody {
    fn from(sig: &Signature) -> Self {
        Self {
            timestamp: sig.timestamp.to_rfc3339(),
            name: sig.name.clone(),
            email: sig.email.as_str().to_string(),
            district: sig.district.as_str().to_string(),
            representative: sig.representative.as_str().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct SessionSnapshot {
    pub step: Step,
    pub candidates: Vec<String>,
    pub district: Option<String>,
    pub representative: Option<String>,
    /// Where an outstanding verification code was sent.
    pub pending_email: Option<String>,
}

impl SessionSnapshot {
    fn of(session: &PledgeSession) -> Self {
        Self {
            step: session.step(),
            candidates: session
                .candidates()
                .iter()
                .map(|c| c.display_name.clone())
                .collect(),
            district: session.district().map(|d| d.as_str().to_string()),
            representative: session.representative().map(|r| r.as_str().to_string()),
            pending_email: session.pending_email().map(|e| e.as_str().to_string()),
        }
    }
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub signatures: u64,
    pub districts: u64,
}

#[derive(Deserialize)]
pub struct AdminResetRequest {
    pub confirm: String,
}

#[derive(Serialize)]
pub struct AdminResetResponse {
    pub cleared: bool,
}

// ── Session lifecycle ────────────────────────────────────────────────────

pub(crate) fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<CreateSessionResponse> {
    let session_id = new_session_id();
    state.insert_session(session_id.clone(), PledgeSession::new());
    info!(session = %session_id, "session created");
    Json(CreateSessionResponse { session_id })
}

pub async fn session_snapshot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    state.peek_session(&id, SessionSnapshot::of).map(Json)
}

// ── Workflow transitions ─────────────────────────────────────────────────

pub async fn search_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let mut session = state.take_session(&id)?;
    let result = state.workflow.search_address(&mut session, &req.query).await;
    state.put_session(&id, session);
    let candidates = result?;
    Ok(Json(SearchResponse {
        candidates: candidates.into_iter().map(|c| c.display_name).collect(),
    }))
}

pub async fn confirm_address(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<DistrictResponse>, ApiError> {
    let mut session = state.take_session(&id)?;
    let result = state.workflow.confirm_address(&mut session, req.index).await;
    let step = session.step();
    state.put_session(&id, session);
    let resolution = result?;
    Ok(Json(DistrictResponse {
        district: resolution.district.as_str().to_string(),
        representative: resolution.representative.as_str().to_string(),
        step,
    }))
}

pub async fn enter_district(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ManualDistrictRequest>,
) -> Result<Json<DistrictResponse>, ApiError> {
    let mut session = state.take_session(&id)?;
    let result =
        state
            .workflow
            .enter_district_manually(&mut session, &req.district, &req.representative);
    let step = session.step();
    state.put_session(&id, session);
    let resolution = result?;
    Ok(Json(DistrictResponse {
        district: resolution.district.as_str().to_string(),
        representative: resolution.representative.as_str().to_string(),
        step,
    }))
}

pub async fn submit_identity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<IdentityRequest>,
) -> Result<Json<IdentityResponse>, ApiError> {
    let mut session = state.take_session(&id)?;
    let result = state
        .workflow
        .submit_identity(&mut session, &req.name, &req.email)
        .await;
    let step = session.step();
    state.put_session(&id, session);
    let outcome = result?;
    let signature = match &outcome {
        IdentityOutcome::CodeSent => None,
        IdentityOutcome::Committed(sig) => Some(SignatureBody::from(sig)),
    };
    Ok(Json(IdentityResponse { step, signature }))
}

pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<SignatureResponse>, ApiError> {
    let mut session = state.take_session(&id)?;
    let result = state.workflow.submit_code(&mut session, &req.code).await;
    let step = session.step();
    state.put_session(&id, session);
    let signature = result?;
    Ok(Json(SignatureResponse {
        step,
        signature: SignatureBody::from(&signature),
    }))
}

pub async fn restart(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let mut session = state.take_session(&id)?;
    state.workflow.restart(&mut session);
    let snapshot = SessionSnapshot::of(&session);
    state.put_session(&id, session);
    Ok(Json(snapshot))
}

// ── Read-side and admin ──────────────────────────────────────────────────

pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let rows = state.store.read_all().await?;
    let districts: HashSet<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    Ok(Json(StatsResponse {
        signatures: rows.len() as u64,
        districts: districts.len() as u64,
    }))
}

/// Destructive: clears the entire signature store. Requires the admin
/// token header and an exact confirmation phrase. Bypasses the ledger
/// and its guards — the one sanctioned shrink.
pub async fn admin_reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AdminResetRequest>,
) -> Result<Json<AdminResetResponse>, ApiError> {
    let expected = state.admin_token.as_deref().ok_or(ApiError::AdminDisabled)?;
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::AdminUnauthorized)?;
    if presented != expected {
        return Err(ApiError::AdminUnauthorized);
    }
    if req.confirm != RESET_CONFIRM_PHRASE {
        return Err(ApiError::AdminConfirmation);
    }

    state.store.overwrite_all(&[]).await?;
    warn!("signature store cleared by admin reset");
    Ok(Json(AdminResetResponse { cleared: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_hex_and_unique_enough() {
        let a = new_session_id();
        let b = new_session_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn identity_response_omits_absent_signature() {
        let body = serde_json::to_string(&IdentityResponse {
            step: Step::AwaitingCode,
            signature: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"step":"awaiting_code"}"#);
    }

    #[test]
    fn requests_deserialize_from_minimal_json() {
        let req: ManualDistrictRequest =
            serde_json::from_str(r#"{"district": "NY-14"}"#).unwrap();
        assert_eq!(req.district, "NY-14");
        assert_eq!(req.representative, "");

        let req: SearchRequest = serde_json::from_str(r#"{"query": "123 Main"}"#).unwrap();
        assert_eq!(req.query, "123 Main");
    }
}
