use reqwest::StatusCode;

use crate::api::{ApiError, BugTrackerApi};
use crate::auth::session::UserRef;
use crate::auth::store::SessionStore;
use crate::bugs::filter::BugFilter;
use crate::bugs::models::{Bug, BugChanges, BugStatus, NewBug};

/// Which store action failed; picks the fallback error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    FetchAll,
    FetchOne,
    Create,
    Update,
    UpdateStatus,
    Assign,
    Delete,
    FetchDevelopers,
}

impl Action {
    fn fallback(self) -> &'static str {
        match self {
            Action::FetchAll => "Failed to fetch bugs",
            Action::FetchOne => "Failed to fetch bug",
            Action::Create => "Failed to create bug",
            Action::Update => "Failed to update bug",
            Action::UpdateStatus => "Failed to update bug status",
            Action::Assign => "Failed to assign bug",
            Action::Delete => "Failed to delete bug",
            Action::FetchDevelopers => "Failed to fetch developers",
        }
    }

    fn forbidden(self) -> &'static str {
        match self {
            Action::UpdateStatus => "You do not have permission to update this bug",
            Action::Update => "You do not have permission to edit this bug",
            Action::Assign => "You do not have permission to assign bugs",
            Action::Delete => "You do not have permission to delete bugs",
            _ => "You do not have permission to view this",
        }
    }
}

/// Human-readable text for a failed call, as shown next to the list.
fn describe(action: Action, err: &ApiError) -> String {
    if let ApiError::InvalidStatus(_) = err {
        return err.to_string();
    }
    match err.status() {
        Some(StatusCode::UNAUTHORIZED) => "Your session has expired, please log in again".into(),
        Some(StatusCode::NOT_FOUND) if action != Action::FetchAll => "Bug not found".into(),
        Some(StatusCode::FORBIDDEN) => err
            .server_message()
            .unwrap_or(action.forbidden())
            .to_string(),
        Some(StatusCode::BAD_REQUEST) => err
            .server_message()
            .unwrap_or("Invalid request")
            .to_string(),
        _ => err
            .server_message()
            .unwrap_or(action.fallback())
            .to_string(),
    }
}

/// In-memory copy of the bug list plus the outcome of the last action.
///
/// Every action sets `loading` while the request is in flight, records a
/// readable `error` when it fails and then hands the error back to the
/// caller. A 401 from any action also invalidates the session.
///
/// Actions borrow the store mutably, so `loading` is only seen from outside
/// by embedders that poll the action future themselves. An action dropped
/// mid-request (say by a timeout) leaves it set until the next action.
#[derive(Debug, Default)]
pub struct BugStore {
    bugs: Vec<Bug>,
    current: Option<Bug>,
    developers: Vec<UserRef>,
    loading: bool,
    error: Option<String>,
}

impl BugStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn current(&self) -> Option<&Bug> {
        self.current.as_ref()
    }

    pub fn developers(&self) -> &[UserRef] {
        &self.developers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Bug> {
        self.bugs.iter().find(|b| b.id == id)
    }

    pub fn by_status(&self, status: BugStatus) -> Vec<&Bug> {
        self.bugs.iter().filter(|b| b.status == status).collect()
    }

    pub fn open_bugs(&self) -> Vec<&Bug> {
        self.by_status(BugStatus::Open)
    }

    pub fn in_progress_bugs(&self) -> Vec<&Bug> {
        self.by_status(BugStatus::InProgress)
    }

    pub fn resolved_bugs(&self) -> Vec<&Bug> {
        self.by_status(BugStatus::Resolved)
    }

    pub fn closed_bugs(&self) -> Vec<&Bug> {
        self.by_status(BugStatus::Closed)
    }

    pub fn assigned_to(&self, user_id: &str) -> Vec<&Bug> {
        self.bugs.iter().filter(|b| b.is_assigned_to(user_id)).collect()
    }

    pub fn filter(&self, filter: &BugFilter) -> Vec<&Bug> {
        self.bugs.iter().filter(|b| filter.matches(b)).collect()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Close out an action: clear `loading`, record the error text and
    /// invalidate the session on 401.
    fn finish<T>(
        &mut self,
        action: Action,
        session: &mut SessionStore,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        self.loading = false;
        if let Err(err) = &result {
            let message = describe(action, err);
            tracing::error!(?action, "{}: {}", message, err);
            if err.is_unauthorized() {
                session.invalidate();
            }
            self.error = Some(message);
        }
        result
    }

    /// Replace the list with exactly what the server returns, in order.
    pub async fn fetch_all(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
    ) -> Result<&[Bug], ApiError> {
        self.begin();
        let result = api.list_bugs(session.token()).await;
        let bugs = self.finish(Action::FetchAll, session, result)?;
        tracing::debug!(count = bugs.len(), "Fetched bugs");
        self.bugs = dedup_by_id(bugs);
        Ok(&self.bugs)
    }

    pub async fn fetch_by_id(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        id: &str,
    ) -> Result<Bug, ApiError> {
        self.begin();
        let result = api.get_bug(session.token(), id).await;
        let bug = self.finish(Action::FetchOne, session, result)?;
        self.current = Some(bug.clone());
        Ok(bug)
    }

    /// Report a bug and append the server's record to the list.
    pub async fn create(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        data: &NewBug,
    ) -> Result<Bug, ApiError> {
        self.begin();
        let result = api.create_bug(session.token(), data).await;
        let bug = self.finish(Action::Create, session, result)?;
        tracing::info!(id = %bug.id, "Reported bug");
        self.upsert(bug.clone());
        Ok(bug)
    }

    /// Change a bug's status. Only `status` is updated locally; the rest of
    /// the cached record is left as it was. `Closed` is refused without a
    /// request.
    pub async fn update_status(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        id: &str,
        status: BugStatus,
    ) -> Result<Bug, ApiError> {
        self.begin();
        let result = if status.is_settable() {
            api.update_status(session.token(), id, status).await
        } else {
            Err(ApiError::InvalidStatus(status))
        };
        let bug = self.finish(Action::UpdateStatus, session, result)?;
        match self.bugs.iter_mut().find(|b| b.id == id) {
            Some(local) => local.status = status,
            None => tracing::warn!(id, "Updated bug is not in the local list"),
        }
        if let Some(current) = self.current.as_mut().filter(|b| b.id == id) {
            current.status = status;
        }
        tracing::info!(id, %status, "Updated bug status");
        Ok(bug)
    }

    /// Assign a bug to a developer and take the server's record.
    pub async fn assign(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        id: &str,
        developer_id: &str,
    ) -> Result<Bug, ApiError> {
        self.begin();
        let result = api.assign_bug(session.token(), id, developer_id).await;
        let bug = self.finish(Action::Assign, session, result)?;
        tracing::info!(id, developer_id, "Assigned bug");
        self.replace(bug.clone());
        Ok(bug)
    }

    /// Edit title, description or priority.
    pub async fn update(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        id: &str,
        changes: &BugChanges,
    ) -> Result<Bug, ApiError> {
        self.begin();
        let result = api.update_bug(session.token(), id, changes).await;
        let bug = self.finish(Action::Update, session, result)?;
        self.replace(bug.clone());
        Ok(bug)
    }

    pub async fn delete(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
        id: &str,
    ) -> Result<(), ApiError> {
        self.begin();
        let result = api.delete_bug(session.token(), id).await;
        self.finish(Action::Delete, session, result)?;
        self.bugs.retain(|b| b.id != id);
        if self.current.as_ref().is_some_and(|b| b.id == id) {
            self.current = None;
        }
        tracing::info!(id, "Deleted bug");
        Ok(())
    }

    /// Load the developers a bug can be assigned to.
    pub async fn fetch_developers(
        &mut self,
        api: &dyn BugTrackerApi,
        session: &mut SessionStore,
    ) -> Result<&[UserRef], ApiError> {
        self.begin();
        let result = api.developers(session.token()).await;
        self.developers = self.finish(Action::FetchDevelopers, session, result)?;
        Ok(&self.developers)
    }

    /// Replace the record with the same id, or append it.
    fn upsert(&mut self, bug: Bug) {
        match self.bugs.iter_mut().find(|b| b.id == bug.id) {
            Some(existing) => *existing = bug,
            None => self.bugs.push(bug),
        }
    }

    /// Replace the record with the same id; unknown ids are not added.
    fn replace(&mut self, bug: Bug) {
        if let Some(current) = self.current.as_mut().filter(|b| b.id == bug.id) {
            *current = bug.clone();
        }
        match self.bugs.iter_mut().find(|b| b.id == bug.id) {
            Some(existing) => *existing = bug,
            None => tracing::warn!(id = %bug.id, "Bug not found in local list"),
        }
    }
}

/// Keep the first record of every id, preserving server order.
fn dedup_by_id(bugs: Vec<Bug>) -> Vec<Bug> {
    let mut seen = std::collections::HashSet::new();
    bugs.into_iter()
        .filter(|b| seen.insert(b.id.clone()))
        .collect()
}
