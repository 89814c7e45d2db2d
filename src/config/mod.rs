use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// SQLite URL of the project store
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Port the project API listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL the dashboard talks to, derived from `port` when unset
    #[serde(default)]
    pub api_url: Option<String>,
    /// Where the dashboard writes its log, since it owns the terminal
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_database_url() -> String {
    "sqlite://projects.db".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_file() -> PathBuf {
    PathBuf::from("project-tracker.log")
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn api_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}
