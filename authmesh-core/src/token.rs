//! Access tokens and the keyed token store contract.
//!
//! This module provides:
//! - [`Token`] - An access token with its type, expiry and refresh token
//! - [`TokenSet`] - Trait for token storage keyed by service key
//! - [`TokenError`] - Errors from token lookup and refresh

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secret::Secret;

/// Tokens expiring within this many seconds are treated as expired.
const EXPIRY_DELTA_SECS: i64 = 10;

/// Error type for token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token is stored for the requested service key.
    #[error("no token available for service key '{key}'")]
    NotFound { key: String },

    /// The token has expired and cannot be refreshed.
    #[error("token expired: {message}")]
    Expired { message: String },

    /// Token refresh failed.
    #[error("token refresh failed: {message}")]
    RefreshFailed { message: String },

    /// The storage backend failed.
    ///
    /// Returned by [`TokenSet`] implementations backed by external storage;
    /// the in-memory set never fails.
    #[error("token storage error: {message}")]
    Storage { message: String },
}

/// An OAuth2 access token.
///
/// The serialized form uses the field names of the common OAuth2 token JSON
/// document (`access_token`, `token_type`, `refresh_token`, `expiry`), so
/// token files written by other OAuth2 tooling load directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The access token value.
    pub access_token: Secret,

    /// Token type as issued (e.g. "Bearer"). Empty means Bearer.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,

    /// Refresh token, if the provider issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Secret>,

    /// When the access token expires. `None` means it never does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a non-expiring bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Secret::new(access_token),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: None,
        }
    }

    /// Set the token type.
    pub fn with_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Set the expiration time.
    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Set the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(Secret::new(refresh_token));
        self
    }

    /// Normalized token type used in the `Authorization` header.
    pub fn kind(&self) -> String {
        let raw = self.token_type.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("bearer") {
            "Bearer".to_string()
        } else if raw.eq_ignore_ascii_case("mac") {
            "MAC".to_string()
        } else if raw.eq_ignore_ascii_case("basic") {
            "Basic".to_string()
        } else {
            raw.to_string()
        }
    }

    /// Effective expiry; the zero timestamp some encoders emit counts as unset.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|exp| exp.year() > 1)
    }

    /// Check if this token has expired (with a small safety margin).
    ///
    /// Returns `false` if no expiration is set.
    pub fn is_expired(&self) -> bool {
        self.expires_at()
            .map(|exp| exp - chrono::Duration::seconds(EXPIRY_DELTA_SECS) < Utc::now())
            .unwrap_or(false)
    }

    /// A token is usable when it has a value and has not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.kind(), self.access_token.expose())
    }
}

/// Keyed store of access tokens.
///
/// Implementations must be safe to share between request handlers. A
/// lookup for an absent key is an error, never an empty token, so callers
/// cannot silently send anonymous requests.
///
/// # Example
///
/// ```rust,ignore
/// use authmesh_core::{MemoryTokenSet, Token, TokenSet};
///
/// let tokens = MemoryTokenSet::new();
/// tokens.set_token("crm-prod", Token::new("abc")).await?;
/// let token = tokens.get_token("crm-prod").await?;
/// ```
#[async_trait]
pub trait TokenSet: Send + Sync {
    /// Retrieve the token stored under `key`.
    async fn get_token(&self, key: &str) -> Result<Token, TokenError>;

    /// Store `token` under `key`, replacing any previous token.
    async fn set_token(&self, key: &str, token: Token) -> Result<(), TokenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_expired() {
        let expired = Token::new("test").with_expiry(Utc::now() - chrono::Duration::hours(1));
        assert!(expired.is_expired());

        let valid = Token::new("test").with_expiry(Utc::now() + chrono::Duration::hours(1));
        assert!(!valid.is_expired());

        let no_expiry = Token::new("test");
        assert!(!no_expiry.is_expired());
    }

    #[test]
    fn test_token_expiring_within_delta_is_expired() {
        let token = Token::new("test").with_expiry(Utc::now() + chrono::Duration::seconds(3));
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_zero_expiry_never_expires() {
        let token: Token = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expiry":"0001-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(token.expires_at().is_none());
        assert!(token.is_valid());
    }

    #[test]
    fn test_token_kind_normalization() {
        assert_eq!(Token::new("t").with_type("bearer").kind(), "Bearer");
        assert_eq!(Token::new("t").with_type("").kind(), "Bearer");
        assert_eq!(Token::new("t").with_type("mac").kind(), "MAC");
        assert_eq!(Token::new("t").with_type("basic").kind(), "Basic");
        assert_eq!(Token::new("t").with_type("Custom").kind(), "Custom");
    }

    #[test]
    fn test_token_json_document() {
        let token: Token = serde_json::from_str(
            r#"{
                "access_token": "access",
                "token_type": "bearer",
                "refresh_token": "refresh",
                "expiry": "2099-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(token.access_token.expose(), "access");
        assert_eq!(token.refresh_token.as_ref().map(|r| r.expose()), Some("refresh"));
        assert_eq!(token.authorization_value(), "Bearer access");
        assert!(!token.is_expired());
    }

    #[test]
    fn test_empty_token_is_invalid() {
        assert!(!Token::new("").is_valid());
    }
}
