pub mod cli;
pub mod config;
pub mod github;

pub use config::Config;
pub use github::{FlowOutcome, TokenError};
