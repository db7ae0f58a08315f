//! Command-line interface for gh-app-token.
//!
//! Without a subcommand, mints an installation access token and prints it.
//! - `check` - Validate configuration and key material without calling GitHub

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{Config, ConfigOverrides, FileConfig, OutputFormat};
use crate::github::{run, sign_with_key_file, GitHubAppClient};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "gh-app-token")]
#[command(author, version, about = "Mint a GitHub App installation access token", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gh-app-token.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// GitHub App ID
    #[arg(long, env = "GITHUB_APP_ID")]
    pub app_id: Option<String>,

    /// Path to the GitHub App private key (PEM)
    #[arg(long, env = "GITHUB_APP_PK_FILE")]
    pub private_key_file: Option<PathBuf>,

    /// Organization the app is installed on
    #[arg(long, env = "GITHUB_ORG")]
    pub org: Option<String>,

    /// GitHub API base URL (default: https://api.github.com)
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// HTTP request timeout in seconds (default: 30)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output format for the issued token
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Subcommand to run (if none, mints a token)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and sign a test JWT without contacting GitHub
    Check,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            app_id: self.app_id.clone(),
            private_key_file: self.private_key_file.clone(),
            org: self.org.clone(),
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs,
            format: self.format,
        }
    }

    /// Resolve the effective configuration from flags, env and `file`.
    pub fn resolve_config(&self, file: &FileConfig) -> Result<Config> {
        Ok(Config::resolve(self.overrides(), &file.github)?)
    }
}

/// Run the selected command
pub async fn run_command(cli: &Cli, file: &FileConfig) -> Result<()> {
    let config = cli.resolve_config(file)?;

    match &cli.command {
        Some(Commands::Check) => cmd_check(&config),
        None => cmd_token(&config).await,
    }
}

/// Mint a token and print the outcome line on stdout
async fn cmd_token(config: &Config) -> Result<()> {
    let client = GitHubAppClient::new(&config.api_url, config.timeout)
        .context("Failed to create HTTP client")?;

    let outcome = run(config, &client).await?;
    println!("{}", outcome.render(config.format));

    Ok(())
}

/// Validate configuration and key material
fn cmd_check(config: &Config) -> Result<()> {
    let jwt = sign_with_key_file(&config.app_id, &config.private_key_file)?;

    println!("[OK] Configuration is valid");
    println!();
    println!("  App ID:       {}", config.app_id);
    println!("  Private Key:  {}", config.private_key_file.display());
    println!("  Organization: {}", config.org);
    println!("  API URL:      {}", config.api_url);
    println!("  Timeout:      {}s", config.timeout.as_secs());
    println!(
        "  JWT Expires:  {}",
        chrono::DateTime::from_timestamp(jwt.claims().exp, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| jwt.claims().exp.to_string())
    );

    Ok(())
}
