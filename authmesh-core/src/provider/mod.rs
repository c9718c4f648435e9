//! OAuth provider capabilities and registry.
//!
//! This module provides:
//! - [`ProviderType`] - The built-in providers
//! - [`OAuth2Util`] - Capability object: attach a client, fetch the current user
//! - [`ProviderRegistry`] - Maps provider keys to capability constructors
//!
//! The registry comes pre-configured with the built-in providers and can be
//! extended with custom ones without touching this module.

mod aha;
mod facebook;
mod google;
mod ringcentral;
pub mod scim;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::client::{ClientError, HttpClient};

pub use aha::AhaUtil;
pub use facebook::FacebookUtil;
pub use google::GoogleUtil;
pub use ringcentral::RingCentralUtil;
pub use scim::{ScimEmail, ScimName, ScimUser};

/// Error type for provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No capability is registered for the provider.
    #[error("unsupported provider: {provider}")]
    Unsupported { provider: String },

    /// The name does not identify a built-in provider.
    #[error("unknown provider name: {name}")]
    UnknownName { name: String },

    /// The capability has no HTTP client attached.
    #[error("no HTTP client set for provider {provider}")]
    NoClient { provider: String },

    /// The provider's API call failed.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The client could not authorize the request.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Built-in OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    Aha,
    Facebook,
    Google,
    RingCentral,
}

impl ProviderType {
    /// All built-in providers.
    pub const ALL: [ProviderType; 4] = [
        ProviderType::Aha,
        ProviderType::Facebook,
        ProviderType::Google,
        ProviderType::RingCentral,
    ];

    /// Registry key for the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aha => "aha",
            Self::Facebook => "facebook",
            Self::Google => "google",
            Self::RingCentral => "ringcentral",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ProviderError;

    /// Case-sensitive lookup of the registry key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProviderError::UnknownName {
                name: s.to_string(),
            })
    }
}

/// Provider capability object.
///
/// Every supported provider implements this pair; callers never reach a
/// vendor endpoint except through it.
#[async_trait]
pub trait OAuth2Util: Send + Sync {
    /// Attach the authenticated client used for API calls.
    fn set_client(&mut self, client: HttpClient);

    /// Fetch the authenticated user as a normalized SCIM record.
    async fn get_scim_user(&self) -> Result<ScimUser, ProviderError>;
}

/// Constructor for a provider capability.
pub type UtilConstructor = fn() -> Box<dyn OAuth2Util>;

/// Registry of provider capabilities.
///
/// # Example
///
/// ```
/// use authmesh_core::provider::{ProviderRegistry, ProviderType};
///
/// let registry = ProviderRegistry::with_defaults();
/// assert!(registry.resolve(ProviderType::Google).is_ok());
/// assert!(registry.resolve_by_name("myspace").is_err());
/// ```
#[derive(Clone)]
pub struct ProviderRegistry {
    constructors: HashMap<String, UtilConstructor>,
    fallback: Option<String>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            fallback: None,
        }
    }

    /// Create a registry with the built-in providers registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ProviderType::Aha.as_str(), || -> Box<dyn OAuth2Util> {
            Box::new(AhaUtil::default())
        });
        registry.register(ProviderType::Facebook.as_str(), || -> Box<dyn OAuth2Util> {
            Box::new(FacebookUtil::default())
        });
        registry.register(ProviderType::Google.as_str(), || -> Box<dyn OAuth2Util> {
            Box::new(GoogleUtil::default())
        });
        registry.register(ProviderType::RingCentral.as_str(), || -> Box<dyn OAuth2Util> {
            Box::new(RingCentralUtil::default())
        });
        registry
    }

    /// Register a provider constructor.
    ///
    /// If a provider with the same key already exists, it will be replaced.
    pub fn register(&mut self, key: impl Into<String>, constructor: UtilConstructor) {
        self.constructors.insert(key.into(), constructor);
    }

    /// Resolve unknown names to `key` instead of failing.
    ///
    /// Off by default; unknown names are errors unless a caller opts in.
    pub fn with_fallback(mut self, key: impl Into<String>) -> Self {
        self.fallback = Some(key.into());
        self
    }

    /// Build the capability for a built-in provider.
    pub fn resolve(&self, provider: ProviderType) -> Result<Box<dyn OAuth2Util>, ProviderError> {
        self.constructors
            .get(provider.as_str())
            .map(|constructor| constructor())
            .ok_or_else(|| ProviderError::Unsupported {
                provider: provider.to_string(),
            })
    }

    /// Build the capability registered under `name` (case-sensitive).
    pub fn resolve_by_name(&self, name: &str) -> Result<Box<dyn OAuth2Util>, ProviderError> {
        if let Some(constructor) = self.constructors.get(name) {
            return Ok(constructor());
        }

        match self.fallback.as_deref().and_then(|key| self.constructors.get(key)) {
            Some(constructor) => {
                tracing::debug!(name, fallback = ?self.fallback, "Using fallback provider");
                Ok(constructor())
            }
            None => Err(ProviderError::Unsupported {
                provider: name.to_string(),
            }),
        }
    }

    /// Check if a provider is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// List all registered provider keys, sorted.
    pub fn list_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// Remove a provider from the registry.
    pub fn remove(&mut self, key: &str) -> Option<UtilConstructor> {
        self.constructors.remove(key)
    }

    /// Get the number of registered providers.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list_keys())
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// GET `url` with the attached client and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: Option<&HttpClient>,
    provider: ProviderType,
    url: &str,
) -> Result<T, ProviderError> {
    let client = client.ok_or_else(|| ProviderError::NoClient {
        provider: provider.to_string(),
    })?;

    let response = client.get(url).await?.send().await?.error_for_status()?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_round_trip() {
        for provider in ProviderType::ALL {
            assert_eq!(provider.as_str().parse::<ProviderType>().unwrap(), provider);
        }
    }

    #[test]
    fn test_provider_type_is_case_sensitive() {
        assert!(matches!(
            "Google".parse::<ProviderType>(),
            Err(ProviderError::UnknownName { .. })
        ));
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ProviderRegistry::with_defaults();

        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.list_keys(),
            vec!["aha", "facebook", "google", "ringcentral"]
        );
        for provider in ProviderType::ALL {
            assert!(registry.resolve(provider).is_ok());
        }
    }

    #[test]
    fn test_resolve_unregistered_provider() {
        let mut registry = ProviderRegistry::with_defaults();
        registry.remove("aha");

        assert!(matches!(
            registry.resolve(ProviderType::Aha),
            Err(ProviderError::Unsupported { provider }) if provider == "aha"
        ));
    }

    #[test]
    fn test_resolve_by_name_unknown_is_error() {
        let registry = ProviderRegistry::with_defaults();
        assert!(matches!(
            registry.resolve_by_name("RingCentral"),
            Err(ProviderError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_resolve_by_name_with_explicit_fallback() {
        let registry = ProviderRegistry::with_defaults().with_fallback("ringcentral");
        assert!(registry.resolve_by_name("unknown").is_ok());
    }

    #[test]
    fn test_register_custom_provider() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        registry.register("corp-sso", || -> Box<dyn OAuth2Util> {
            Box::new(GoogleUtil::default())
        });

        assert!(registry.contains("corp-sso"));
        assert!(registry.resolve_by_name("corp-sso").is_ok());
    }

    #[tokio::test]
    async fn test_scim_user_without_client() {
        let registry = ProviderRegistry::with_defaults();
        let util = registry.resolve(ProviderType::Google).unwrap();

        assert!(matches!(
            util.get_scim_user().await,
            Err(ProviderError::NoClient { .. })
        ));
    }
}
