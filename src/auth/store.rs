use serde::Serialize;

use crate::api::{BugTrackerApi, Credentials, RegisterResponse, Registration};
use crate::auth::session::{Role, Session, UserRef};
use crate::auth::storage::{KeyValueStore, StorageError, ROLE_KEY, TOKEN_KEY, USER_KEY};

/// Result of a registration attempt. Failures are reported, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RegisterResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Owns the current [`Session`] and mirrors it into persistent storage.
pub struct SessionStore {
    session: Session,
    storage: Box<dyn KeyValueStore>,
}

impl SessionStore {
    /// Rehydrate the session from `storage`. A token without a readable user
    /// or role still counts as a session; the server decides if it is valid.
    pub fn restore(storage: Box<dyn KeyValueStore>) -> Self {
        let token = storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user: Option<UserRef> = storage
            .get(USER_KEY)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable stored user: {}", e);
                    None
                }
            });
        let role: Option<Role> = storage
            .get(ROLE_KEY)
            .and_then(|r| r.parse().ok())
            .or_else(|| user.as_ref().and_then(|u| u.role));

        let session = Session { token, user, role };
        if session.is_authenticated() {
            tracing::debug!(role = ?session.role, "Restored session");
        }
        Self { session, storage }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&UserRef> {
        self.session.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in and persist the session. Returns `false` on any failure; a
    /// rejected login also wipes whatever credentials were stored before.
    pub async fn login(&mut self, api: &dyn BugTrackerApi, credentials: &Credentials) -> bool {
        match api.login(credentials).await {
            Ok(response) => {
                let session = Session::new(response.token, response.user);
                if let Err(e) = self.persist(&session) {
                    tracing::error!("Failed to persist session, keeping it in memory only: {}", e);
                    self.forget_stored();
                }
                tracing::info!(role = ?session.role, "Logged in as {}", credentials.email);
                self.session = session;
                true
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.clear();
                }
                tracing::warn!("Login failed: {}", e);
                false
            }
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(
        &mut self,
        api: &dyn BugTrackerApi,
        registration: &Registration,
    ) -> RegisterOutcome {
        match api.register(registration).await {
            Ok(data) => {
                tracing::info!("Registered {} as {}", registration.email, registration.role);
                RegisterOutcome {
                    success: true,
                    data: Some(data),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                let error = e
                    .server_message()
                    .unwrap_or("Registration failed")
                    .to_string();
                RegisterOutcome {
                    success: false,
                    data: None,
                    error: Some(error),
                }
            }
        }
    }

    pub fn logout(&mut self) {
        self.clear();
        tracing::info!("Logged out");
    }

    /// Drop the session after the server rejected its token.
    pub fn invalidate(&mut self) {
        if self.session.is_authenticated() {
            tracing::warn!("Session rejected by server, clearing stored credentials");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.session.clear();
        self.forget_stored();
    }

    /// Best effort: a half-written session must not be restored next run.
    fn forget_stored(&mut self) {
        for key in [TOKEN_KEY, ROLE_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::error!("Failed to clear stored {}: {}", key, e);
            }
        }
    }

    fn persist(&mut self, session: &Session) -> Result<(), StorageError> {
        match &session.token {
            Some(token) => self.storage.set(TOKEN_KEY, token)?,
            None => self.storage.remove(TOKEN_KEY)?,
        }
        match session.role {
            Some(role) => self.storage.set(ROLE_KEY, role.as_str())?,
            None => self.storage.remove(ROLE_KEY)?,
        }
        match &session.user {
            Some(user) => {
                let json = serde_json::to_string(user).map_err(|source| StorageError::Corrupt {
                    path: USER_KEY.into(),
                    source,
                })?;
                self.storage.set(USER_KEY, &json)?;
            }
            None => self.storage.remove(USER_KEY)?,
        }
        Ok(())
    }
}
