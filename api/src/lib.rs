//! HTTP surface for the sign-up workflow.
//!
//! One route per workflow transition, keyed by an opaque session id. The
//! session registry hands a session out to exactly one request at a time,
//! so concurrent requests against the same id cannot interleave a
//! transition; different sessions proceed independently and share nothing
//! but the signature store.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{router, serve};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pledge_store::TabularStore;
use pledge_workflow::{PledgeSession, PledgeWorkflow};

/// Shared state behind every handler.
pub struct AppState {
    pub(crate) workflow: PledgeWorkflow,
    /// `None` in a slot means the session is checked out by a request.
    sessions: Mutex<HashMap<String, Option<PledgeSession>>>,
    pub(crate) store: Arc<dyn TabularStore>,
    pub(crate) admin_token: Option<String>,
}

impl AppState {
    pub fn new(workflow: PledgeWorkflow, store: Arc<dyn TabularStore>) -> Self {
        Self {
            workflow,
            sessions: Mutex::new(HashMap::new()),
            store,
            admin_token: None,
        }
    }

    /// Enable the guarded admin endpoints with a shared-secret token.
    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.admin_token = Some(token.to_string());
        self
    }

    pub(crate) fn insert_session(&self, id: String, session: PledgeSession) {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(id, Some(session));
    }

    /// Check a session out for exclusive use by one request.
    pub(crate) fn take_session(&self, id: &str) -> Result<PledgeSession, ApiError> {
        let mut sessions = self.sessions.lock().expect("session registry poisoned");
        match sessions.get_mut(id) {
            Some(slot) => slot.take().ok_or(ApiError::SessionBusy),
            None => Err(ApiError::UnknownSession(id.to_string())),
        }
    }

    /// Return a checked-out session.
    pub(crate) fn put_session(&self, id: &str, session: PledgeSession) {
        self.sessions
            .lock()
            .expect("session registry poisoned")
            .insert(id.to_string(), Some(session));
    }

    /// Read-only view of a session, if present and not checked out.
    pub(crate) fn peek_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&PledgeSession) -> T,
    ) -> Result<T, ApiError> {
        let sessions = self.sessions.lock().expect("session registry poisoned");
        match sessions.get(id) {
            Some(Some(session)) => Ok(f(session)),
            Some(None) => Err(ApiError::SessionBusy),
            None => Err(ApiError::UnknownSession(id.to_string())),
        }
    }
}
