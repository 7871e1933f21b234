//! In-memory `BugTrackerApi` for unit tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

use super::{ApiError, BugTrackerApi, Credentials, LoginResponse, RegisterResponse, Registration};
use crate::auth::session::{Role, UserRef};
use crate::bugs::models::{Bug, BugChanges, BugStatus, NewBug};

pub const VALID_TOKEN: &str = "token-123";

#[derive(Default)]
struct Inner {
    bugs: Vec<Bug>,
    next_id: u32,
    fail_next: Option<(StatusCode, String)>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn with_bugs(bugs: Vec<Bug>) -> Self {
        let api = Self::default();
        {
            let mut inner = api.inner.lock().unwrap();
            inner.next_id = bugs.len() as u32 + 1;
            inner.bugs = bugs;
        }
        api
    }

    /// Make the next call fail with `status` and an `{"error": message}` body.
    pub fn fail_next(&self, status: StatusCode, message: &str) {
        self.inner.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn stored(&self, id: &str) -> Option<Bug> {
        self.inner
            .lock()
            .unwrap()
            .bugs
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    fn enter(&self, call: &str, token: Option<&str>, needs_auth: bool) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call.to_string());
        if let Some((status, message)) = inner.fail_next.take() {
            return Err(ApiError::from_response(
                status,
                &serde_json::json!({ "error": message }).to_string(),
            ));
        }
        if needs_auth && token != Some(VALID_TOKEN) {
            return Err(ApiError::Unauthorized(Some("Invalid token".into())));
        }
        Ok(())
    }

    fn with_bug<T>(&self, id: &str, f: impl FnOnce(&mut Bug) -> T) -> Result<T, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.bugs.iter_mut().find(|b| b.id == id) {
            Some(bug) => Ok(f(bug)),
            None => Err(ApiError::from_response(
                StatusCode::NOT_FOUND,
                r#"{"error":"Bug not found"}"#,
            )),
        }
    }
}

pub fn bug(id: &str, title: &str, status: BugStatus) -> Bug {
    Bug {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        priority: Default::default(),
        status,
        assigned_to: None,
        reported_by: Some(UserRef::new("reporter", "Reporter")),
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl BugTrackerApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.enter("login", None, false)?;
        if credentials.password != "password123" {
            return Err(ApiError::Unauthorized(Some(
                "Invalid email or password".into(),
            )));
        }
        Ok(LoginResponse {
            token: VALID_TOKEN.to_string(),
            user: UserRef {
                id: "u1".into(),
                name: "Test User".into(),
                email: Some(credentials.email.clone()),
                role: Some(Role::Developer),
            },
        })
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, ApiError> {
        self.enter("register", None, false)?;
        Ok(RegisterResponse {
            user: UserRef {
                id: "new-user".into(),
                name: registration.name.clone(),
                email: Some(registration.email.clone()),
                role: Some(registration.role),
            },
        })
    }

    async fn developers(&self, token: Option<&str>) -> Result<Vec<UserRef>, ApiError> {
        self.enter("developers", token, false)?;
        Ok(vec![
            UserRef::new("dev1", "Developer 1").with_role(Role::Developer),
            UserRef::new("dev2", "Developer 2").with_role(Role::Developer),
        ])
    }

    async fn list_bugs(&self, token: Option<&str>) -> Result<Vec<Bug>, ApiError> {
        self.enter("list_bugs", token, true)?;
        Ok(self.inner.lock().unwrap().bugs.clone())
    }

    async fn get_bug(&self, token: Option<&str>, id: &str) -> Result<Bug, ApiError> {
        self.enter("get_bug", token, true)?;
        self.with_bug(id, |b| b.clone())
    }

    async fn create_bug(&self, token: Option<&str>, new: &NewBug) -> Result<Bug, ApiError> {
        self.enter("create_bug", token, true)?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let created = Bug {
            id: format!("srv-{}", inner.next_id),
            title: new.title.clone(),
            description: new.description.clone(),
            priority: new.priority,
            status: BugStatus::Open,
            assigned_to: None,
            reported_by: Some(UserRef::new("u1", "Test User")),
            created_at: None,
            updated_at: None,
        };
        inner.bugs.push(created.clone());
        Ok(created)
    }

    async fn update_bug(
        &self,
        token: Option<&str>,
        id: &str,
        changes: &BugChanges,
    ) -> Result<Bug, ApiError> {
        self.enter("update_bug", token, true)?;
        self.with_bug(id, |b| {
            if let Some(title) = &changes.title {
                b.title = title.clone();
            }
            if let Some(description) = &changes.description {
                b.description = description.clone();
            }
            if let Some(priority) = changes.priority {
                b.priority = priority;
            }
            b.clone()
        })
    }

    async fn update_status(
        &self,
        token: Option<&str>,
        id: &str,
        status: BugStatus,
    ) -> Result<Bug, ApiError> {
        self.enter("update_status", token, true)?;
        self.with_bug(id, |b| {
            b.status = status;
            // The real backend also bumps metadata; the store must not copy it.
            b.title = format!("{} (server)", b.title);
            b.clone()
        })
    }

    async fn assign_bug(
        &self,
        token: Option<&str>,
        id: &str,
        developer_id: &str,
    ) -> Result<Bug, ApiError> {
        self.enter("assign_bug", token, true)?;
        self.with_bug(id, |b| {
            b.assigned_to = Some(UserRef::new(developer_id, "Assigned Dev"));
            b.clone()
        })
    }

    async fn delete_bug(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        self.enter("delete_bug", token, true)?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.bugs.len();
        inner.bugs.retain(|b| b.id != id);
        if inner.bugs.len() == before {
            return Err(ApiError::from_response(
                StatusCode::NOT_FOUND,
                r#"{"error":"Bug not found"}"#,
            ));
        }
        Ok(())
    }
}
