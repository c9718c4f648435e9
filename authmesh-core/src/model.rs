//! Domain model types shared across the crate.
//!
//! - [`AuthorizationType`] - HTTP authorization schemes
//! - [`ApplicationCredentials`] - A client registration bound to an API server
//! - [`UserCredentials`] - A resource owner's username and password

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{Endpoint, OAuth2Config};
use crate::secret::Secret;

/// HTTP authorization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationType {
    Anonymous,
    Basic,
    Bearer,
    Digest,
    #[serde(rename = "NTLM")]
    Ntlm,
    Negotiate,
    #[serde(rename = "OAuth")]
    OAuth,
}

impl AuthorizationType {
    /// Canonical scheme name, as used in the `Authorization` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "Anonymous",
            Self::Basic => "Basic",
            Self::Bearer => "Bearer",
            Self::Digest => "Digest",
            Self::Ntlm => "NTLM",
            Self::Negotiate => "Negotiate",
            Self::OAuth => "OAuth",
        }
    }
}

impl fmt::Display for AuthorizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Anonymous" => Ok(Self::Anonymous),
            "Basic" => Ok(Self::Basic),
            "Bearer" => Ok(Self::Bearer),
            "Digest" => Ok(Self::Digest),
            "NTLM" => Ok(Self::Ntlm),
            "Negotiate" => Ok(Self::Negotiate),
            "OAuth" => Ok(Self::OAuth),
            other => Err(format!("unknown authorization type '{}'", other)),
        }
    }
}

/// Client registration for one service, bound to its API server.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCredentials {
    /// Base URL of the service's API (e.g. `https://platform.example.com`).
    pub server_url: String,

    pub client_id: String,

    pub client_secret: Secret,

    pub endpoint: Endpoint,
}

impl ApplicationCredentials {
    /// Create application credentials.
    pub fn new(
        server_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
            endpoint,
        }
    }

    /// OAuth2 configuration requesting `scopes`.
    pub fn config(&self, scopes: Vec<String>) -> OAuth2Config {
        OAuth2Config::new(
            self.client_id.clone(),
            self.client_secret.expose(),
            self.endpoint.clone(),
        )
        .with_scopes(scopes)
    }

    /// Resolve an API path against the server URL.
    ///
    /// Exactly one `/` separates the server URL and `path`.
    pub fn api_url(&self, path: &str) -> Result<url::Url, url::ParseError> {
        let base = format!("{}/", self.server_url.trim_end_matches('/'));
        url::Url::parse(&base)?.join(path.trim_start_matches('/'))
    }
}

/// A resource owner's credentials for the password grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub username: String,
    pub password: Secret,
}

impl UserCredentials {
    /// Create user credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Secret::new(password),
        }
    }
}
