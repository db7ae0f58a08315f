//! Error taxonomy for the installation token exchange.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while minting an installation access token.
///
/// An app that is not installed on the organization is reported through
/// [`FlowOutcome::NoInstallation`](super::flow::FlowOutcome::NoInstallation).
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Failed to read private key file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to sign app JWT: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {body}")]
    Network { status: StatusCode, body: String },

    #[error("GitHub rejected the app credentials: {status} - {message}")]
    Auth { status: StatusCode, message: String },
}

impl TokenError {
    /// Classify a non-success response from the GitHub API.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TokenError::Auth {
                status,
                message: body,
            },
            _ => TokenError::Network { status, body },
        }
    }
}

pub type Result<T, E = TokenError> = std::result::Result<T, E>;
