//! GitHub App authentication.
//!
//! This module provides:
//! - JWT generation for GitHub App authentication
//! - A client for the app-level installation endpoints
//! - The installation access token exchange itself

pub mod api_client;
pub mod error;
pub mod flow;
pub mod token_manager;

pub use api_client::{AccessToken, GitHubAppClient, Installation, InstallationApi};
pub use error::TokenError;
pub use flow::{exchange_access_token, resolve_installation_id, run, FlowOutcome};
pub use token_manager::{generate_app_jwt, sign_with_key_file, AppJwt};
