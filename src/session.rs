//! Explicit session context for pipeline calls.
//!
//! The source application read worker identity and role out of ambient
//! per-browser session storage with implicit string lookups. Here the
//! session is an explicit, typed value passed into
//! [`PagingController::bootstrap`](crate::controller::PagingController::bootstrap),
//! with the defaulting rules spelled out:
//!
//! - `worker_id`: no default. A session without one yields an empty,
//!   non-error ready state instead of loading data.
//! - `stage`: defaults to [`DEFAULT_STAGE`] and is sent with every
//!   backend request.
//! - `role`: informational only; no default.

/// Backend deployment stage sent with every request.
pub const DEFAULT_STAGE: &str = "prod";

/// Typed session context for a booth worker's browsing session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    worker_id: Option<String>,
    role: Option<String>,
    stage: String,
}

impl SessionContext {
    /// Create a session for the given party worker.
    pub fn new<S: Into<String>>(worker_id: S) -> Self {
        SessionContext {
            worker_id: Some(worker_id.into()),
            role: None,
            stage: DEFAULT_STAGE.to_string(),
        }
    }

    /// Create a session with no worker identity.
    ///
    /// Bootstrapping with an anonymous session reaches the ready state with
    /// zero records and never contacts the backend.
    pub fn anonymous() -> Self {
        SessionContext {
            worker_id: None,
            role: None,
            stage: DEFAULT_STAGE.to_string(),
        }
    }

    /// Set the worker's role.
    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Override the backend stage.
    pub fn with_stage<S: Into<String>>(mut self, stage: S) -> Self {
        self.stage = stage.into();
        self
    }

    /// The party worker identity, if the session has one.
    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    /// The worker's role, if known.
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// The backend stage for this session.
    pub fn stage(&self) -> &str {
        &self.stage
    }
}
