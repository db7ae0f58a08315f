//! GitHub API client for app-level operations.
//!
//! Every call here authenticates with an app JWT, not an installation token.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};

use super::error::{Result, TokenError};
use super::token_manager::AppJwt;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size GitHub accepts for `GET /app/installations`.
pub const MAX_PER_PAGE: u32 = 100;

/// App-level GitHub endpoints needed to mint an installation token.
#[async_trait]
pub trait InstallationApi: Send + Sync {
    /// `GET /app/installations`, one page at a time (pages start at 1).
    async fn list_installations(
        &self,
        jwt: &AppJwt,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<Installation>>;

    /// `POST /app/installations/{id}/access_tokens`
    async fn create_access_token(&self, jwt: &AppJwt, installation_id: u64)
        -> Result<AccessToken>;
}

/// reqwest-backed [`InstallationApi`].
pub struct GitHubAppClient {
    base_url: String,
    client: reqwest::Client,
}

impl GitHubAppClient {
    /// Create a client against `base_url` (e.g. `https://api.github.com`, or
    /// `https://ghe.example.com/api/v3` for GitHub Enterprise Server).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gh-app-token/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder, jwt: &AppJwt) -> reqwest::RequestBuilder {
        request
            .bearer_auth(jwt.as_str())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TokenError::from_status(status, body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl InstallationApi for GitHubAppClient {
    async fn list_installations(
        &self,
        jwt: &AppJwt,
        per_page: u32,
        page: u32,
    ) -> Result<Vec<Installation>> {
        let url = format!(
            "{}/app/installations?per_page={}&page={}",
            self.base_url, per_page, page
        );

        self.send(self.authorize(self.client.get(url), jwt)).await
    }

    async fn create_access_token(
        &self,
        jwt: &AppJwt,
        installation_id: u64,
    ) -> Result<AccessToken> {
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.base_url, installation_id
        );

        self.send(self.authorize(self.client.post(url), jwt)).await
    }
}

/// A GitHub App installation, as listed by `GET /app/installations`.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    /// Null for some enterprise-level installations.
    #[serde(default)]
    pub account: Option<InstallationAccount>,
}

impl Installation {
    pub fn account_login(&self) -> Option<&str> {
        self.account.as_ref().map(|account| account.login.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    pub login: String,
}

/// Installation access token returned by
/// `POST /app/installations/{id}/access_tokens`.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
