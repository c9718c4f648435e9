//! Authenticated HTTP clients.
//!
//! This module provides:
//! - [`HttpClient`] - A `reqwest` client that attaches credentials to every request
//! - [`ClientOptions`] / [`TlsConfig`] - Per-client transport settings
//! - Factory functions (re-exported from [`factory`]) for each credential shape
//!
//! Static credentials (basic auth, API tokens, custom headers) are installed
//! as default headers on the underlying client. OAuth2 tokens are attached
//! per request so that an expired token can be refreshed first.

pub mod factory;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Certificate, Identity, IntoUrl, Method, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::OAuth2Config;
use crate::oauth;
use crate::token::{Token, TokenError};

pub use factory::*;

/// Error type for client construction and authorization.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No token value was supplied.
    #[error("no token provided")]
    EmptyToken,

    /// A header name or value could not be encoded.
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    /// The HTTP client or TLS material could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A token document could not be decoded.
    #[error("invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An OAuth2 exchange or configuration failed.
    #[error("OAuth error: {message}")]
    OAuth { message: String },

    /// The attached token is unusable.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Custom TLS material for a client.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Extra PEM-encoded root certificates to trust.
    pub root_certificates_pem: Vec<Vec<u8>>,

    /// PEM-encoded client certificate and private key for mutual TLS.
    pub identity_pem: Option<Vec<u8>>,
}

/// Transport settings applied when a client is built.
///
/// These are passed explicitly to every factory; there is no process-wide
/// TLS switch.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Accept invalid server certificates. Never the default.
    pub tls_insecure_skip_verify: bool,

    /// Overall request timeout.
    pub timeout: Option<Duration>,

    /// Custom TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl ClientOptions {
    /// Options with certificate verification disabled.
    pub fn insecure() -> Self {
        Self {
            tls_insecure_skip_verify: true,
            ..Self::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the TLS configuration.
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }
}

/// Build the underlying `reqwest` client.
pub(crate) fn build_http(
    opts: &ClientOptions,
    headers: HeaderMap,
) -> Result<reqwest::Client, ClientError> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .default_headers(headers);

    if opts.tls_insecure_skip_verify {
        tracing::warn!("TLS certificate verification disabled for this client");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(timeout) = opts.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(tls) = &opts.tls {
        for pem in &tls.root_certificates_pem {
            builder = builder.add_root_certificate(Certificate::from_pem(pem)?);
        }
        if let Some(identity) = &tls.identity_pem {
            builder = builder.identity(Identity::from_pem(identity)?);
        }
    }

    Ok(builder.build()?)
}

/// Token attached to a client, refreshed on demand.
struct TokenSource {
    config: Option<OAuth2Config>,
    token: Mutex<Token>,
}

impl TokenSource {
    /// Return the `Authorization` value, refreshing the token first if needed.
    async fn authorization(&self) -> Result<HeaderValue, ClientError> {
        let mut token = self.token.lock().await;

        if !token.is_valid() {
            let (Some(config), Some(refresh)) = (&self.config, &token.refresh_token) else {
                return Err(TokenError::Expired {
                    message: "token is expired and cannot be refreshed".to_string(),
                }
                .into());
            };

            let refreshed = oauth::refresh_token(config, refresh).await?;
            tracing::info!(client_id = %config.client_id, "Refreshed expired access token");
            *token = refreshed;
        }

        let mut value =
            HeaderValue::from_str(&token.authorization_value()).map_err(|_| {
                ClientError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                }
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// HTTP client with credentials attached.
///
/// Cloning is cheap and clones share the same token, so a refresh performed
/// through one clone is visible to all of them.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    source: Option<Arc<TokenSource>>,
}

impl HttpClient {
    /// Wrap a client whose credentials are baked into its default headers.
    pub(crate) fn with_static_auth(inner: reqwest::Client) -> Self {
        Self {
            inner,
            source: None,
        }
    }

    /// Wrap a client that authorizes with an OAuth2 token.
    ///
    /// `config` enables refreshing; without it an expired token is an error.
    pub(crate) fn with_token(
        inner: reqwest::Client,
        token: Token,
        config: Option<OAuth2Config>,
    ) -> Self {
        Self {
            inner,
            source: Some(Arc::new(TokenSource {
                config,
                token: Mutex::new(token),
            })),
        }
    }

    /// Start a request with authorization attached.
    pub async fn request(
        &self,
        method: Method,
        url: impl IntoUrl,
    ) -> Result<RequestBuilder, ClientError> {
        let builder = self.inner.request(method, url);
        match &self.source {
            Some(source) => Ok(builder.header(AUTHORIZATION, source.authorization().await?)),
            None => Ok(builder),
        }
    }

    /// Start an authorized `GET` request.
    pub async fn get(&self, url: impl IntoUrl) -> Result<RequestBuilder, ClientError> {
        self.request(Method::GET, url).await
    }

    /// Start an authorized `POST` request.
    pub async fn post(&self, url: impl IntoUrl) -> Result<RequestBuilder, ClientError> {
        self.request(Method::POST, url).await
    }

    /// Start an authorized `PUT` request.
    pub async fn put(&self, url: impl IntoUrl) -> Result<RequestBuilder, ClientError> {
        self.request(Method::PUT, url).await
    }

    /// Start an authorized `DELETE` request.
    pub async fn delete(&self, url: impl IntoUrl) -> Result<RequestBuilder, ClientError> {
        self.request(Method::DELETE, url).await
    }

    /// The current OAuth2 token, if this client uses one.
    pub async fn token(&self) -> Option<Token> {
        match &self.source {
            Some(source) => Some(source.token.lock().await.clone()),
            None => None,
        }
    }

    /// The underlying `reqwest` client (static credentials only).
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("oauth2_token", &self.source.is_some())
            .finish()
    }
}
