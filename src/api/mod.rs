pub mod error;
pub mod http;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::session::{Role, UserRef};
use crate::bugs::models::{Bug, BugChanges, BugStatus, NewBug};

pub use error::ApiError;
pub use http::HttpApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub user: UserRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: BugStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment<'a> {
    pub developer_id: &'a str,
}

/// Every call the client makes against the bug tracker backend.
///
/// `token` is the bearer token of the current session, if any. An HTTP 401
/// surfaces as [`ApiError::Unauthorized`]; invalidating the session is the
/// caller's job.
#[async_trait]
pub trait BugTrackerApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, ApiError>;

    async fn developers(&self, token: Option<&str>) -> Result<Vec<UserRef>, ApiError>;

    async fn list_bugs(&self, token: Option<&str>) -> Result<Vec<Bug>, ApiError>;

    async fn get_bug(&self, token: Option<&str>, id: &str) -> Result<Bug, ApiError>;

    async fn create_bug(&self, token: Option<&str>, bug: &NewBug) -> Result<Bug, ApiError>;

    async fn update_bug(
        &self,
        token: Option<&str>,
        id: &str,
        changes: &BugChanges,
    ) -> Result<Bug, ApiError>;

    async fn update_status(
        &self,
        token: Option<&str>,
        id: &str,
        status: BugStatus,
    ) -> Result<Bug, ApiError>;

    async fn assign_bug(
        &self,
        token: Option<&str>,
        id: &str,
        developer_id: &str,
    ) -> Result<Bug, ApiError>;

    async fn delete_bug(&self, token: Option<&str>, id: &str) -> Result<(), ApiError>;
}
