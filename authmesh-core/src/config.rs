//! OAuth2 client configuration produced by the credential parsers.
//!
//! An [`OAuth2Config`] is the normalized form of one client registration:
//! client id/secret, requested scopes, the provider [`Endpoint`] and an
//! optional redirect URL. It knows how to build an authorization URL and,
//! through [`crate::oauth`], how to exchange credentials for tokens.

use oauth2::{CsrfToken, Scope};
use serde::{Deserialize, Serialize};

use crate::client::ClientError;
use crate::oauth::create_oauth_client;
use crate::secret::Secret;

/// Facebook authorization endpoint, used to default Facebook credentials.
pub const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v3.2/dialog/oauth";

/// Facebook token endpoint, used to default Facebook credentials.
pub const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v3.2/oauth/access_token";

/// Authorization and token URLs of an OAuth2 provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Authorization endpoint URL.
    pub auth_url: String,

    /// Token endpoint URL.
    pub token_url: String,
}

impl Endpoint {
    /// Create an endpoint from its two URLs.
    pub fn new(auth_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }

    /// The well-known Facebook endpoint.
    pub fn facebook() -> Self {
        Self::new(FACEBOOK_AUTH_URL, FACEBOOK_TOKEN_URL)
    }
}

/// Normalized OAuth2 client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OAuth2Config {
    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret (may be empty for public clients).
    pub client_secret: Secret,

    /// Scopes requested during authorization and token exchange.
    pub scopes: Vec<String>,

    /// Provider endpoint.
    pub endpoint: Endpoint,

    /// Redirect URL registered for the client, if any.
    pub redirect_url: Option<String>,
}

impl OAuth2Config {
    /// Create a configuration with a client id, secret and endpoint.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
            scopes: Vec::new(),
            endpoint,
            redirect_url: None,
        }
    }

    /// Set the requested scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Set the redirect URL.
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Build the URL a user visits to authorize this client.
    ///
    /// Returns the URL together with the random `state` value that the
    /// redirect handler must verify.
    pub fn auth_code_url(&self) -> Result<(url::Url, String), ClientError> {
        if self.endpoint.auth_url.trim().is_empty() {
            return Err(ClientError::OAuth {
                message: "no auth URL configured".to_string(),
            });
        }
        let client = create_oauth_client(self)?;
        let (url, state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();
        Ok((url, state.secret().to_string()))
    }
}
