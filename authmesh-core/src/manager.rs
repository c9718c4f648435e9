//! Keyed OAuth2 client manager.
//!
//! [`OAuth2Manager`] pairs a [`ConfigMoreSet`] (client registrations) with a
//! [`TokenSet`] (issued tokens) under the same service key, and builds an
//! authenticated [`HttpClient`] from the pair on demand.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use authmesh_core::{OAuth2Manager, Token};
//!
//! let manager = OAuth2Manager::in_memory();
//! manager.add_config_more_json("crm", br#"{"web":{"client_id":"id"}}"#)?;
//! manager.set_token("crm", Token::new("access")).await?;
//!
//! let client = manager.get_client("crm").await?;
//! let response = client.get("https://crm.example.com/api/me").await?.send().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use thiserror::Error;

use crate::client::{ClientError, ClientOptions, HttpClient, new_client_config_token};
use crate::config_set::{ConfigMoreSet, ConfigSetError};
use crate::store::MemoryTokenSet;
use crate::token::{Token, TokenError, TokenSet};

/// Error type for manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// A required component was never attached.
    #[error("{component} not set")]
    Unconfigured { component: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigSetError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Builds authenticated clients for configured services.
///
/// Both components are optional so a manager can be assembled in steps;
/// operations that need a missing component fail with
/// [`ManagerError::Unconfigured`].
#[derive(Clone, Default)]
pub struct OAuth2Manager {
    config_set: Option<Arc<ConfigMoreSet>>,
    token_set: Option<Arc<dyn TokenSet>>,
    client_options: ClientOptions,
}

impl OAuth2Manager {
    /// Create a manager over the given config and token sets.
    pub fn new(config_set: Arc<ConfigMoreSet>, token_set: Arc<dyn TokenSet>) -> Self {
        Self {
            config_set: Some(config_set),
            token_set: Some(token_set),
            client_options: ClientOptions::default(),
        }
    }

    /// Create a manager with neither component attached.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a manager backed by an empty config set and in-memory tokens.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(ConfigMoreSet::new()),
            Arc::new(MemoryTokenSet::new()),
        )
    }

    pub fn with_config_set(mut self, config_set: Arc<ConfigMoreSet>) -> Self {
        self.config_set = Some(config_set);
        self
    }

    pub fn with_token_set(mut self, token_set: Arc<dyn TokenSet>) -> Self {
        self.token_set = Some(token_set);
        self
    }

    /// Transport settings for clients built by this manager.
    pub fn with_client_options(mut self, options: ClientOptions) -> Self {
        self.client_options = options;
        self
    }

    fn config_set(&self) -> Result<&ConfigMoreSet, ManagerError> {
        self.config_set
            .as_deref()
            .ok_or(ManagerError::Unconfigured {
                component: "config set",
            })
    }

    fn token_set(&self) -> Result<&dyn TokenSet, ManagerError> {
        self.token_set
            .as_deref()
            .ok_or(ManagerError::Unconfigured {
                component: "token set",
            })
    }

    /// Build a client for `key` from its stored config and token.
    ///
    /// The client refreshes the token through the config's token endpoint
    /// once it expires. The refreshed token is held by the client only; it
    /// is not written back to the token set.
    pub async fn get_client(&self, key: &str) -> Result<HttpClient, ManagerError> {
        let configs = self.config_set()?;
        let tokens = self.token_set()?;

        let config = configs.config(key)?;
        let token = tokens.get_token(key).await?;

        tracing::debug!(key, client_id = %config.client_id, "Building client");
        Ok(new_client_config_token(&config, token, &self.client_options)?)
    }

    /// Store the token for `key`.
    pub async fn set_token(&self, key: &str, token: Token) -> Result<(), ManagerError> {
        Ok(self.token_set()?.set_token(key, token).await?)
    }

    /// Fetch the stored token for `key`.
    pub async fn get_token(&self, key: &str) -> Result<Token, ManagerError> {
        Ok(self.token_set()?.get_token(key).await?)
    }

    /// Parse a credentials document and store it under `key`.
    pub fn add_config_more_json(&self, key: &str, data: &[u8]) -> Result<(), ManagerError> {
        Ok(self.config_set()?.add_config_more_json(key, data)?)
    }

    /// Service keys with a stored configuration.
    pub fn keys(&self) -> Vec<String> {
        self.config_set
            .as_ref()
            .map(|set| set.keys())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for OAuth2Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Manager")
            .field("config_set", &self.config_set)
            .field("token_set", &self.token_set.is_some())
            .field("client_options", &self.client_options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &[u8] = br#"{"installed":{"client_id":"cli-id","client_secret":"s",
        "auth_uri":"https://example.com/auth","token_uri":"https://example.com/token"}}"#;

    #[tokio::test]
    async fn test_get_client_without_config_set() {
        let manager = OAuth2Manager::empty();
        let result = manager.get_client("svc").await;
        assert!(matches!(
            result,
            Err(ManagerError::Unconfigured { component: "config set" })
        ));
    }

    #[tokio::test]
    async fn test_get_client_without_token_set() {
        let manager = OAuth2Manager::empty().with_config_set(Arc::new(ConfigMoreSet::new()));
        manager.add_config_more_json("svc", CONFIG).unwrap();

        let result = manager.get_client("svc").await;
        assert!(matches!(
            result,
            Err(ManagerError::Unconfigured { component: "token set" })
        ));
    }

    #[tokio::test]
    async fn test_get_client_unknown_key_without_token_set() {
        let manager = OAuth2Manager::empty().with_config_set(Arc::new(ConfigMoreSet::new()));

        let result = manager.get_client("svc").await;
        assert!(matches!(
            result,
            Err(ManagerError::Unconfigured { component: "token set" })
        ));
    }

    #[tokio::test]
    async fn test_get_client_unknown_key() {
        let manager = OAuth2Manager::in_memory();
        let result = manager.get_client("missing").await;
        assert!(matches!(
            result,
            Err(ManagerError::Config(ConfigSetError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_client_config_without_token() {
        let manager = OAuth2Manager::in_memory();
        manager.add_config_more_json("svc", CONFIG).unwrap();

        let result = manager.get_client("svc").await;
        assert!(matches!(
            result,
            Err(ManagerError::Token(TokenError::NotFound { key })) if key == "svc"
        ));
    }

    #[tokio::test]
    async fn test_get_client_carries_token() {
        let manager = OAuth2Manager::in_memory();
        manager.add_config_more_json("svc", CONFIG).unwrap();
        manager.set_token("svc", Token::new("abc")).await.unwrap();

        let client = manager.get_client("svc").await.unwrap();
        let token = client.token().await.unwrap();
        assert_eq!(token.access_token.expose(), "abc");
    }

    struct FailingTokenSet;

    #[async_trait::async_trait]
    impl TokenSet for FailingTokenSet {
        async fn get_token(&self, _key: &str) -> Result<Token, TokenError> {
            Err(TokenError::Storage {
                message: "backend offline".to_string(),
            })
        }

        async fn set_token(&self, _key: &str, _token: Token) -> Result<(), TokenError> {
            Err(TokenError::Storage {
                message: "backend offline".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_propagated() {
        let manager = OAuth2Manager::new(
            Arc::new(ConfigMoreSet::new()),
            Arc::new(FailingTokenSet),
        );
        manager.add_config_more_json("svc", CONFIG).unwrap();

        assert!(matches!(
            manager.set_token("svc", Token::new("abc")).await,
            Err(ManagerError::Token(TokenError::Storage { .. }))
        ));
        assert!(matches!(
            manager.get_client("svc").await,
            Err(ManagerError::Token(TokenError::Storage { message })) if message == "backend offline"
        ));
    }

    #[test]
    fn test_add_config_without_config_set() {
        let manager = OAuth2Manager::empty();
        assert!(matches!(
            manager.add_config_more_json("svc", CONFIG),
            Err(ManagerError::Unconfigured { .. })
        ));
        assert!(manager.keys().is_empty());
    }
}
