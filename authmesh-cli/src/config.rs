//! CLI configuration handling.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use authmesh_core::ClientOptions;
use authmesh_core::credentials::{DEFAULT_CREDENTIALS_ENV, DEFAULT_SCOPES_ENV};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Pattern selecting credential variables for `list-env`.
    pub env_prefix: String,

    /// Variable holding a single credentials document.
    pub credentials_env: String,

    /// Variable holding comma-separated scopes.
    pub scopes_env: String,

    /// Logging level when `RUST_LOG` is unset.
    pub log_level: String,

    pub tls_insecure_skip_verify: bool,

    /// Request timeout in seconds; 0 disables it.
    pub timeout_secs: u64,

    /// Path to the configuration file that was loaded.
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            env_prefix: "AUTHMESH_OAUTH_".to_string(),
            credentials_env: DEFAULT_CREDENTIALS_ENV.to_string(),
            scopes_env: DEFAULT_SCOPES_ENV.to_string(),
            log_level: "info".to_string(),
            tls_insecure_skip_verify: false,
            timeout_secs: 30,
            config_path: PathBuf::new(),
        }
    }
}

impl CliConfig {
    /// Client options derived from this configuration.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions {
            tls_insecure_skip_verify: self.tls_insecure_skip_verify,
            ..ClientOptions::default()
        };
        if self.timeout_secs > 0 {
            options = options.with_timeout(Duration::from_secs(self.timeout_secs));
        }
        options
    }
}

/// Load configuration from `path`, or from the platform config directory.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let config_path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path(),
    };

    let mut config = if config_path.exists() {
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?
    } else {
        CliConfig::default()
    };

    config.config_path = config_path;
    Ok(config)
}

fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("cli.toml"))
        .unwrap_or_else(|| PathBuf::from("authmesh-cli.toml"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "authmesh", "authmesh")
}
