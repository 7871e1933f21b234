use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::{
    ApiError, Assignment, BugTrackerApi, Credentials, LoginResponse, RegisterResponse,
    Registration, StatusUpdate,
};
use crate::auth::session::UserRef;
use crate::bugs::models::{Bug, BugChanges, BugStatus, NewBug};

/// `BugTrackerApi` over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL. Ids are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<String, ApiError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, authenticated = token.is_some(), "API request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            tracing::debug!(%method, %url, %status, "API response");
            Ok(text)
        } else {
            tracing::warn!(%method, %url, %status, body = %text, "API error");
            Err(ApiError::from_response(status, &text))
        }
    }

    async fn send<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let text = self.execute(method, segments, token, body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl BugTrackerApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.send(Method::POST, &["auth", "login"], None, Some(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<RegisterResponse, ApiError> {
        self.send(Method::POST, &["auth", "register"], None, Some(registration))
            .await
    }

    async fn developers(&self, token: Option<&str>) -> Result<Vec<UserRef>, ApiError> {
        self.send(Method::GET, &["auth", "developers"], token, NO_BODY)
            .await
    }

    async fn list_bugs(&self, token: Option<&str>) -> Result<Vec<Bug>, ApiError> {
        // The backend answers `null` rather than `[]` when nothing matches.
        let bugs: Option<Vec<Bug>> = self.send(Method::GET, &["bugs"], token, NO_BODY).await?;
        Ok(bugs.unwrap_or_default())
    }

    async fn get_bug(&self, token: Option<&str>, id: &str) -> Result<Bug, ApiError> {
        self.send(Method::GET, &["bugs", id], token, NO_BODY).await
    }

    async fn create_bug(&self, token: Option<&str>, bug: &NewBug) -> Result<Bug, ApiError> {
        self.send(Method::POST, &["bugs"], token, Some(bug)).await
    }

    async fn update_bug(
        &self,
        token: Option<&str>,
        id: &str,
        changes: &BugChanges,
    ) -> Result<Bug, ApiError> {
        self.send(Method::PUT, &["bugs", id], token, Some(changes))
            .await
    }

    async fn update_status(
        &self,
        token: Option<&str>,
        id: &str,
        status: BugStatus,
    ) -> Result<Bug, ApiError> {
        self.send(
            Method::PATCH,
            &["bugs", id, "status"],
            token,
            Some(&StatusUpdate { status }),
        )
        .await
    }

    async fn assign_bug(
        &self,
        token: Option<&str>,
        id: &str,
        developer_id: &str,
    ) -> Result<Bug, ApiError> {
        self.send(
            Method::POST,
            &["bugs", id, "assign"],
            token,
            Some(&Assignment { developer_id }),
        )
        .await
    }

    async fn delete_bug(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &["bugs", id], token, NO_BODY)
            .await
            .map(|_| ())
    }
}
