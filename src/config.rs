use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Deserialize, Clone, Default)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

// Manual Debug impl to avoid leaking the token
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Coordinates of the current run, as exported by the CI runner (`GITHUB_*`).
#[derive(Debug, Deserialize, Clone)]
pub struct RunnerEnv {
    /// `owner/repo` of the repository the run belongs to.
    pub repository: String,
    pub run_id: u64,
    pub sha: String,
    pub event_name: String,
    pub event_path: Option<PathBuf>,
    pub api_url: Option<String>,
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("ghstep").required(false));
        }

        // Environment variable overrides with GHSTEP_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("GHSTEP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Resolve the REST base URL: explicit config, then the runner's, then the public API.
    pub fn api_url(&self, runner: &RunnerEnv) -> String {
        self.github
            .api_url
            .clone()
            .or_else(|| runner.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

impl RunnerEnv {
    /// Read the runner context from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("GITHUB"))
    }

    /// Read the runner context from an explicit map keyed like the environment (`GITHUB_RUN_ID`).
    pub fn from_vars(vars: config::Map<String, String>) -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("GITHUB").source(Some(vars)))
    }

    fn from_source(source: config::Environment) -> Result<Self> {
        config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(format!("Invalid runner environment: {e}")))
    }
}
