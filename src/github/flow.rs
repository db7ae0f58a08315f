//! The installation token exchange: sign an app JWT, resolve the
//! organization's installation, mint an installation access token.

use std::fmt;

use serde_json::json;
use tracing::{debug, info, warn};

use super::api_client::{AccessToken, InstallationApi, MAX_PER_PAGE};
use super::error::Result;
use super::token_manager::{sign_with_key_file, AppJwt};
use crate::config::{Config, OutputFormat};

/// Upper bound on installation pages scanned for one lookup.
pub const MAX_PAGES: u32 = 50;

/// Terminal state of a run.
#[derive(Debug)]
pub enum FlowOutcome {
    TokenIssued(AccessToken),
    /// The app is not installed on the organization. Not an error.
    NoInstallation { org: String },
}

impl FlowOutcome {
    /// Render the outcome as the single line printed on stdout.
    pub fn render(&self, format: OutputFormat) -> String {
        match (self, format) {
            (FlowOutcome::TokenIssued(token), OutputFormat::Env) => {
                format!("GITHUB_TOKEN={}", token.token)
            }
            (FlowOutcome::TokenIssued(token), OutputFormat::Json) => json!({
                "token": token.token,
                "expires_at": token.expires_at,
            })
            .to_string(),
            (FlowOutcome::NoInstallation { .. }, _) => self.to_string(),
        }
    }
}

impl fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowOutcome::TokenIssued(_) => write!(f, "Installation access token issued"),
            FlowOutcome::NoInstallation { org } => {
                write!(f, "No installation found for organization {}", org)
            }
        }
    }
}

/// Find the id of the app's installation on `org`.
///
/// Pages through `GET /app/installations` and stops at the first installation
/// whose account login equals `org` exactly. `Ok(None)` means the app is not
/// installed there. The scan also ends after [`MAX_PAGES`] pages, or when a
/// page repeats the previous one (a server that ignores `page`).
pub async fn resolve_installation_id(
    api: &dyn InstallationApi,
    jwt: &AppJwt,
    org: &str,
) -> Result<Option<u64>> {
    let mut previous_ids: Vec<u64> = Vec::new();

    for page in 1..=MAX_PAGES {
        let installations = api.list_installations(jwt, MAX_PER_PAGE, page).await?;
        debug!(page, count = installations.len(), "Fetched installations page");

        if let Some(installation) = installations
            .iter()
            .find(|installation| installation.account_login() == Some(org))
        {
            return Ok(Some(installation.id));
        }

        if installations.len() < MAX_PER_PAGE as usize {
            return Ok(None);
        }

        let ids: Vec<u64> = installations.iter().map(|installation| installation.id).collect();
        if ids == previous_ids {
            warn!(page, "Installations page repeats the previous page, stopping scan");
            return Ok(None);
        }
        previous_ids = ids;
    }

    warn!(max_pages = MAX_PAGES, "Stopped scanning installations at page limit");
    Ok(None)
}

/// Mint an access token for an already resolved installation.
pub async fn exchange_access_token(
    api: &dyn InstallationApi,
    jwt: &AppJwt,
    installation_id: u64,
) -> Result<AccessToken> {
    api.create_access_token(jwt, installation_id).await
}

/// Run the whole exchange for `config` against `api`.
pub async fn run(config: &Config, api: &dyn InstallationApi) -> Result<FlowOutcome> {
    let jwt = sign_with_key_file(&config.app_id, &config.private_key_file)?;
    info!(app_id = %config.app_id, "Signed app JWT");

    let Some(installation_id) = resolve_installation_id(api, &jwt, &config.org).await? else {
        info!(org = %config.org, "App is not installed on organization");
        return Ok(FlowOutcome::NoInstallation {
            org: config.org.clone(),
        });
    };
    info!(org = %config.org, installation_id, "Resolved installation");

    let token = exchange_access_token(api, &jwt, installation_id).await?;
    info!(installation_id, expires_at = ?token.expires_at, "Issued installation access token");

    Ok(FlowOutcome::TokenIssued(token))
}
