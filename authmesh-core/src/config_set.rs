//! Keyed registry of OAuth2 client configurations.
//!
//! A [`ConfigMoreSet`] maps caller-chosen service keys (e.g. `"crm-prod"`)
//! to parsed [`AppCredentials`]. Entries are validated before they are
//! stored, so a lookup always yields a usable configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use authmesh_core::ConfigMoreSet;
//!
//! // APP_OAUTH_crm={"web":{...}}  ->  key "crm"
//! let configs = ConfigMoreSet::from_env("APP_OAUTH_")?;
//! let config = configs.config("crm")?;
//! ```

use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::OAuth2Config;
use crate::credentials::{AppCredentials, CredentialsError};

/// Error type for config set operations.
#[derive(Debug, Error)]
pub enum ConfigSetError {
    /// No configuration is stored under the key.
    #[error("no OAuth2 config for service key '{key}'")]
    NotFound { key: String },

    /// The credentials for a key could not be parsed.
    #[error("invalid credentials for service key '{key}': {source}")]
    Credentials {
        key: String,
        #[source]
        source: CredentialsError,
    },

    /// The environment prefix is not a valid pattern.
    #[error("invalid environment prefix pattern: {0}")]
    InvalidPrefix(#[from] regex::Error),
}

/// Service key to credentials registry.
///
/// # Thread Safety
///
/// Entries live behind a `RwLock`; the set can be shared across threads
/// via `Arc`.
#[derive(Default)]
pub struct ConfigMoreSet {
    configs: RwLock<HashMap<String, AppCredentials>>,
}

impl ConfigMoreSet {
    /// Create an empty config set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config set from the process environment.
    ///
    /// See [`populate_from_env`](Self::populate_from_env) for the matching rules.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigSetError> {
        let set = Self::new();
        set.populate_from_env(std::env::vars(), prefix)?;
        Ok(set)
    }

    /// Get the credentials stored under `key`.
    pub fn get(&self, key: &str) -> Result<AppCredentials, ConfigSetError> {
        self.configs
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigSetError::NotFound {
                key: key.to_string(),
            })
    }

    /// Get the OAuth2 configuration for `key`.
    pub fn config(&self, key: &str) -> Result<OAuth2Config, ConfigSetError> {
        Ok(self.get(key)?.config())
    }

    /// Store already-parsed credentials under `key`.
    ///
    /// Per-service defaults are applied; any previous entry is replaced.
    pub fn add(&self, key: impl Into<String>, mut credentials: AppCredentials) {
        credentials.defaultify();
        let key = key.into();
        tracing::debug!(key = %key, client_id = %credentials.client_id, "Stored OAuth2 config");
        self.configs.write().insert(key, credentials);
    }

    /// Parse a credentials document and store it under `key`.
    ///
    /// On failure the set is left unchanged for `key`.
    pub fn add_config_more_json(&self, key: &str, data: &[u8]) -> Result<(), ConfigSetError> {
        let credentials =
            AppCredentials::from_json(data).map_err(|source| ConfigSetError::Credentials {
                key: key.to_string(),
                source,
            })?;
        self.add(key, credentials);
        Ok(())
    }

    /// Populate the set from environment variable pairs.
    ///
    /// Every variable whose trimmed name matches `^<prefix>(.*)` is parsed
    /// as a credentials document and stored under the captured suffix.
    /// `prefix` is a regular expression, so patterns such as `OAUTH_(?:A|B)_`
    /// are accepted.
    ///
    /// Population stops at the first invalid entry and returns its error.
    /// Entries stored before that point are kept (best-effort,
    /// first-error-wins; not atomic).
    pub fn populate_from_env<I, K, V>(&self, env: I, prefix: &str) -> Result<(), ConfigSetError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let pattern = Regex::new(&format!("^{}(.*)", prefix))?;
        let mut added = 0usize;

        for (name, value) in env {
            let name = name.as_ref().trim();
            let Some(key) = pattern
                .captures(name)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };

            self.add_config_more_json(&key, value.as_ref().as_bytes())?;
            added += 1;
        }

        tracing::info!(prefix, added, "Loaded OAuth2 configs from environment");
        Ok(())
    }

    /// Whether `key` has a configuration.
    pub fn contains(&self, key: &str) -> bool {
        self.configs.read().contains_key(key)
    }

    /// All configured keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.configs.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of configured services.
    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    /// Whether no service is configured.
    pub fn is_empty(&self) -> bool {
        self.configs.read().is_empty()
    }
}

impl std::fmt::Debug for ConfigMoreSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMoreSet")
            .field("keys", &self.keys())
            .finish()
    }
}
