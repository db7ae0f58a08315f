use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::api_client::DEFAULT_API_URL;
use crate::github::TokenError;

/// Everything one token exchange needs, resolved once at the process boundary.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub private_key_file: PathBuf,
    pub org: String,
    pub api_url: String,
    pub timeout: Duration,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            private_key_file: PathBuf::new(),
            org: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(default_timeout_secs()),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `GITHUB_TOKEN=<token>`
    #[default]
    Env,
    /// `{"token": ..., "expires_at": ...}`
    Json,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Values given on the command line or through environment variables.
/// These take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub app_id: Option<String>,
    pub private_key_file: Option<PathBuf>,
    pub org: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// On-disk TOML configuration. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GitHubFileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubFileConfig {
    pub app_id: Option<AppId>,
    pub private_key_file: Option<PathBuf>,
    pub org: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// App ids are numeric on GitHub but may be written either way in TOML.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AppId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for AppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppId::Number(id) => write!(f, "{}", id),
            AppId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl FileConfig {
    /// Load `path` if it exists; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: FileConfig = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            Ok(FileConfig::default())
        }
    }
}

impl Config {
    /// Merge overrides over the file layer and check the required inputs.
    ///
    /// Fails with [`TokenError::Config`] naming every missing input, so the
    /// caller aborts before touching the network.
    pub fn resolve(overrides: ConfigOverrides, file: &GitHubFileConfig) -> Result<Self, TokenError> {
        let app_id = non_empty(overrides.app_id)
            .or_else(|| non_empty(file.app_id.as_ref().map(AppId::to_string)));
        let private_key_file = overrides
            .private_key_file
            .or_else(|| file.private_key_file.clone())
            .filter(|path| !path.as_os_str().is_empty());
        let org = non_empty(overrides.org).or_else(|| non_empty(file.org.clone()));

        let mut missing = Vec::new();
        if app_id.is_none() {
            missing.push("GITHUB_APP_ID");
        }
        if private_key_file.is_none() {
            missing.push("GITHUB_APP_PK_FILE");
        }
        if org.is_none() {
            missing.push("GITHUB_ORG");
        }

        let (Some(app_id), Some(private_key_file), Some(org)) = (app_id, private_key_file, org)
        else {
            return Err(TokenError::Config(format!(
                "{} must be set (GITHUB_APP_ID, GITHUB_APP_PK_FILE and GITHUB_ORG are required)",
                missing.join(", ")
            )));
        };

        let api_url = non_empty(overrides.api_url)
            .or_else(|| non_empty(file.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or_else(default_timeout_secs);

        Ok(Self {
            app_id,
            private_key_file,
            org,
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            format: overrides.format.or(file.format).unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
