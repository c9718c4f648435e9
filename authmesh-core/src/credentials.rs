//! Application credential parsing.
//!
//! Credentials arrive as the JSON document OAuth2 providers hand out for
//! installed and web applications:
//!
//! ```json
//! {"installed": {"client_id": "...", "client_secret": "...",
//!                "auth_uri": "...", "token_uri": "...",
//!                "redirect_uris": ["..."], "scopes": ["..."]}}
//! ```
//!
//! Exactly one of `web` or `installed` carries the registration. This module
//! decodes that envelope from bytes, files or environment variables and
//! normalizes it into an [`OAuth2Config`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{Endpoint, OAuth2Config};

/// Environment variable read when no credentials variable is named.
pub const DEFAULT_CREDENTIALS_ENV: &str = "OAUTH2_APP_CREDENTIALS";

/// Environment variable holding comma-separated scopes.
pub const DEFAULT_SCOPES_ENV: &str = "OAUTH2_APP_SCOPES";

/// Error type for credential parsing.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The credentials file could not be read.
    #[error("unable to read credentials file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No credential data was provided.
    #[error("no credentials provided")]
    Empty,

    /// The credential data is not valid JSON for the envelope.
    #[error("malformed credentials: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Neither a `web` nor an `installed` registration is present.
    #[error("no OAuth2 config info: expected a 'web' or 'installed' object")]
    Missing,
}

/// One OAuth2 client registration as found in a credentials document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredentials {
    /// Service name, used for endpoint defaulting (e.g. "facebook").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default)]
    pub redirect_uris: Vec<String>,

    #[serde(default)]
    pub auth_uri: String,

    #[serde(default)]
    pub token_uri: String,

    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AppCredentials {
    /// Decode a credentials envelope and return its registration with
    /// per-service defaults applied.
    pub fn from_json(data: &[u8]) -> Result<Self, CredentialsError> {
        let mut credentials = CredentialsEnvelope::from_json(data)?.into_inner();
        credentials.defaultify();
        Ok(credentials)
    }

    /// Fill in endpoint URLs the service is known to use.
    ///
    /// Only Facebook has a default; every other service must carry its
    /// endpoint explicitly and keeps empty URLs otherwise.
    pub fn defaultify(&mut self) {
        if self.service == "facebook" {
            let endpoint = Endpoint::facebook();
            if self.auth_uri.is_empty() {
                self.auth_uri = endpoint.auth_url;
            }
            if self.token_uri.is_empty() {
                self.token_uri = endpoint.token_url;
            }
        }
    }

    /// Build the OAuth2 configuration for this registration.
    ///
    /// The first redirect URI, if any, becomes the redirect URL.
    pub fn config(&self) -> OAuth2Config {
        let mut config = OAuth2Config::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            Endpoint::new(self.auth_uri.clone(), self.token_uri.clone()),
        )
        .with_scopes(self.scopes.clone());

        if let Some(redirect) = self.redirect_uris.first() {
            config = config.with_redirect_url(redirect.clone());
        }
        config
    }
}

/// A credentials document holding exactly one registration shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsEnvelope {
    /// Web application registration.
    Web(AppCredentials),

    /// Installed (native) application registration.
    Installed(AppCredentials),
}

/// Wire form of the envelope, before the shape is decided.
#[derive(Debug, Default, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    web: Option<AppCredentials>,

    #[serde(default)]
    installed: Option<AppCredentials>,

    #[serde(default)]
    scopes: Vec<String>,
}

impl CredentialsEnvelope {
    /// Decode an envelope from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, CredentialsError> {
        let raw: RawEnvelope = serde_json::from_slice(data)?;
        raw.try_into()
    }

    /// The registration, regardless of shape.
    pub fn credentials(&self) -> &AppCredentials {
        match self {
            Self::Web(c) | Self::Installed(c) => c,
        }
    }

    /// Consume the envelope and return the registration.
    pub fn into_inner(self) -> AppCredentials {
        match self {
            Self::Web(c) | Self::Installed(c) => c,
        }
    }
}

impl TryFrom<RawEnvelope> for CredentialsEnvelope {
    type Error = CredentialsError;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        match (raw.web, raw.installed) {
            (Some(web), Some(_)) => {
                tracing::warn!("Credentials carry both 'web' and 'installed'; using 'web'");
                Ok(Self::Web(web))
            }
            (Some(web), None) => Ok(Self::Web(web)),
            (None, Some(installed)) => Ok(Self::Installed(installed)),
            (None, None) => Err(CredentialsError::Missing),
        }
    }
}

/// Parse a credentials file into an OAuth2 configuration.
pub fn parse_from_file(
    path: impl AsRef<Path>,
    scopes: &[String],
) -> Result<OAuth2Config, CredentialsError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_from_bytes(&data, scopes)
}

/// Parse credentials held in an environment variable.
///
/// An empty `var_name` reads [`DEFAULT_CREDENTIALS_ENV`]. Empty `scopes`
/// reads [`DEFAULT_SCOPES_ENV`] as a comma-separated list.
pub fn parse_from_env(var_name: &str, scopes: &[String]) -> Result<OAuth2Config, CredentialsError> {
    parse_from_env_with(|key| std::env::var(key).ok(), var_name, scopes)
}

/// Like [`parse_from_env`], reading variables through `lookup`.
pub fn parse_from_env_with<F>(
    lookup: F,
    var_name: &str,
    scopes: &[String],
) -> Result<OAuth2Config, CredentialsError>
where
    F: Fn(&str) -> Option<String>,
{
    let var_name = match var_name.trim() {
        "" => DEFAULT_CREDENTIALS_ENV,
        name => name,
    };

    let scopes = if scopes.is_empty() {
        split_scopes(&lookup(DEFAULT_SCOPES_ENV).unwrap_or_default())
    } else {
        scopes.to_vec()
    };

    let data = lookup(var_name).unwrap_or_default();
    parse_from_bytes(data.as_bytes(), &scopes)
}

/// Parse credential bytes into an OAuth2 configuration.
///
/// When `scopes` is empty, scopes are recovered from the document: a
/// top-level `scopes` array first, then the registration's own `scopes`.
pub fn parse_from_bytes(data: &[u8], scopes: &[String]) -> Result<OAuth2Config, CredentialsError> {
    if data.trim_ascii().is_empty() {
        return Err(CredentialsError::Empty);
    }

    let raw: RawEnvelope = serde_json::from_slice(data)?;
    let document_scopes = raw.scopes.clone();
    let mut credentials = CredentialsEnvelope::try_from(raw)?.into_inner();
    credentials.defaultify();

    let mut config = credentials.config();
    if !scopes.is_empty() {
        config.scopes = scopes.to_vec();
    } else if !document_scopes.is_empty() {
        config.scopes = document_scopes;
    }
    Ok(config)
}

/// Split a comma-separated scope list, trimming and dropping empty entries.
pub fn split_scopes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const INSTALLED: &str = r#"{"installed":{
        "client_id":"X","client_secret":"Y",
        "auth_uri":"https://a","token_uri":"https://b",
        "redirect_uris":["urn:ietf:wg:oauth:2.0:oob","http://localhost"],
        "scopes":["s1"]}}"#;

    #[test]
    fn test_parse_from_bytes_installed() {
        let config = parse_from_bytes(INSTALLED.as_bytes(), &[]).unwrap();

        assert_eq!(config.client_id, "X");
        assert_eq!(config.client_secret.expose(), "Y");
        assert_eq!(config.endpoint, Endpoint::new("https://a", "https://b"));
        assert_eq!(config.scopes, vec!["s1"]);
        assert_eq!(config.redirect_url.as_deref(), Some("urn:ietf:wg:oauth:2.0:oob"));
    }

    #[test]
    fn test_parse_from_bytes_explicit_scopes_win() {
        let scopes = vec!["override".to_string()];
        let config = parse_from_bytes(INSTALLED.as_bytes(), &scopes).unwrap();
        assert_eq!(config.scopes, vec!["override"]);
    }

    #[test]
    fn test_parse_from_bytes_top_level_scopes() {
        let data = r#"{"scopes":["top"],"web":{"client_id":"w","scopes":["inner"]}}"#;
        let config = parse_from_bytes(data.as_bytes(), &[]).unwrap();
        assert_eq!(config.scopes, vec!["top"]);
    }

    #[test]
    fn test_parse_from_bytes_empty() {
        assert!(matches!(parse_from_bytes(b"", &[]), Err(CredentialsError::Empty)));
        assert!(matches!(parse_from_bytes(b"  \n\t", &[]), Err(CredentialsError::Empty)));
    }

    #[test]
    fn test_parse_from_bytes_malformed() {
        let result = parse_from_bytes(b"{not json", &[]);
        assert!(matches!(result, Err(CredentialsError::Malformed(_))));
    }

    #[test]
    fn test_parse_from_bytes_missing_shape() {
        let result = parse_from_bytes(br#"{"other":{"client_id":"x"}}"#, &[]);
        assert!(matches!(result, Err(CredentialsError::Missing)));
    }

    #[test]
    fn test_envelope_prefers_web_when_both_present() {
        let data = r#"{"web":{"client_id":"web"},"installed":{"client_id":"installed"}}"#;
        let envelope = CredentialsEnvelope::from_json(data.as_bytes()).unwrap();
        assert!(matches!(envelope, CredentialsEnvelope::Web(_)));
        assert_eq!(envelope.credentials().client_id, "web");
    }

    #[test]
    fn test_facebook_endpoint_defaulting() {
        let data = r#"{"web":{"service":"facebook","client_id":"fb"}}"#;
        let config = parse_from_bytes(data.as_bytes(), &[]).unwrap();
        assert_eq!(config.endpoint, Endpoint::facebook());
    }

    #[test]
    fn test_facebook_keeps_explicit_urls() {
        let data = r#"{"web":{"service":"facebook","auth_uri":"https://custom/auth"}}"#;
        let credentials = AppCredentials::from_json(data.as_bytes()).unwrap();
        assert_eq!(credentials.auth_uri, "https://custom/auth");
        assert_eq!(credentials.token_uri, crate::config::FACEBOOK_TOKEN_URL);
    }

    #[test]
    fn test_other_services_are_not_defaulted() {
        let data = r#"{"web":{"service":"google","client_id":"g"}}"#;
        let config = parse_from_bytes(data.as_bytes(), &[]).unwrap();
        assert_eq!(config.endpoint, Endpoint::default());
    }

    #[test]
    fn test_parse_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("client_secret.json");
        std::fs::write(&path, INSTALLED).unwrap();

        let config = parse_from_file(&path, &[]).unwrap();
        assert_eq!(config.client_id, "X");
    }

    #[test]
    fn test_parse_from_file_unreadable() {
        let result = parse_from_file("/nonexistent/client_secret.json", &[]);
        assert!(matches!(result, Err(CredentialsError::Io { .. })));
    }

    #[test]
    fn test_parse_from_env_defaults() {
        let env: HashMap<&str, String> = HashMap::from([
            (DEFAULT_CREDENTIALS_ENV, INSTALLED.to_string()),
            (DEFAULT_SCOPES_ENV, " a, ,b ,".to_string()),
        ]);

        let config = parse_from_env_with(|k| env.get(k).cloned(), "", &[]).unwrap();
        assert_eq!(config.client_id, "X");
        assert_eq!(config.scopes, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_from_env_named_variable() {
        let env: HashMap<&str, String> = HashMap::from([("MY_CREDS", INSTALLED.to_string())]);
        let scopes = vec!["explicit".to_string()];

        let config = parse_from_env_with(|k| env.get(k).cloned(), "MY_CREDS", &scopes).unwrap();
        assert_eq!(config.scopes, vec!["explicit"]);
    }

    #[test]
    fn test_parse_from_env_unset_is_empty() {
        let result = parse_from_env_with(|_| None, "UNSET", &[]);
        assert!(matches!(result, Err(CredentialsError::Empty)));
    }

    #[test]
    fn test_split_scopes() {
        assert_eq!(split_scopes("a,b , c,,"), vec!["a", "b", "c"]);
        assert!(split_scopes("").is_empty());
    }
}
