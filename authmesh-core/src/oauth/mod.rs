//! OAuth 2.0 grant exchanges.
//!
//! This module turns an [`OAuth2Config`] into an `oauth2` basic client and
//! runs the three exchanges the client factories need:
//! - [`exchange_password`] - Resource Owner Password Credentials grant
//! - [`exchange_code`] - Authorization Code grant
//! - [`refresh_token`] - Refresh Token grant
//!
//! Network failures surface immediately; no retries are attempted here.

use chrono::Utc;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, RedirectUrl, RefreshToken,
    ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenResponse},
    reqwest::async_http_client,
};

use crate::client::ClientError;
use crate::config::OAuth2Config;
use crate::secret::Secret;
use crate::token::{Token, TokenError};

/// Create an OAuth2 client from a configuration.
///
/// The token URL must parse. An empty auth URL is replaced by the token URL,
/// which is enough for every grant except building an authorization URL.
/// An empty client secret produces a public client.
pub fn create_oauth_client(config: &OAuth2Config) -> Result<BasicClient, ClientError> {
    let auth_url = match config.endpoint.auth_url.trim() {
        "" => config.endpoint.token_url.as_str(),
        url => url,
    };
    let auth_url = AuthUrl::new(auth_url.to_string()).map_err(|e| ClientError::OAuth {
        message: format!("invalid auth URL '{}': {}", auth_url, e),
    })?;

    let token_url = TokenUrl::new(config.endpoint.token_url.clone()).map_err(|e| {
        ClientError::OAuth {
            message: format!("invalid token URL '{}': {}", config.endpoint.token_url, e),
        }
    })?;

    let client_secret = if config.client_secret.is_empty() {
        None
    } else {
        Some(ClientSecret::new(config.client_secret.expose().to_string()))
    };

    let mut client = BasicClient::new(
        ClientId::new(config.client_id.clone()),
        client_secret,
        auth_url,
        Some(token_url),
    );

    if let Some(redirect) = &config.redirect_url {
        let redirect_url = RedirectUrl::new(redirect.clone()).map_err(|e| ClientError::OAuth {
            message: format!("invalid redirect URL '{}': {}", redirect, e),
        })?;
        client = client.set_redirect_uri(redirect_url);
    }

    Ok(client)
}

/// Exchange a username and password for a token.
pub async fn exchange_password(
    config: &OAuth2Config,
    username: &str,
    password: &str,
) -> Result<Token, ClientError> {
    let client = create_oauth_client(config)?;

    let response = client
        .exchange_password(
            &ResourceOwnerUsername::new(username.to_string()),
            &ResourceOwnerPassword::new(password.to_string()),
        )
        .add_scopes(config.scopes.iter().cloned().map(Scope::new))
        .request_async(async_http_client)
        .await
        .map_err(|e| ClientError::OAuth {
            message: format!("password grant failed: {}", e),
        })?;

    tracing::debug!(client_id = %config.client_id, "Password grant succeeded");

    Ok(token_from_response(&response, None))
}

/// Exchange an authorization code for a token.
pub async fn exchange_code(config: &OAuth2Config, code: &str) -> Result<Token, ClientError> {
    let client = create_oauth_client(config)?;

    let response = client
        .exchange_code(AuthorizationCode::new(code.trim().to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| ClientError::OAuth {
            message: format!("authorization code exchange failed: {}", e),
        })?;

    tracing::debug!(client_id = %config.client_id, "Authorization code exchange succeeded");

    Ok(token_from_response(&response, None))
}

/// Obtain a new access token using a refresh token.
///
/// The returned token keeps `refresh_token` when the provider does not
/// rotate it.
pub async fn refresh_token(
    config: &OAuth2Config,
    refresh_token: &Secret,
) -> Result<Token, TokenError> {
    let client = create_oauth_client(config).map_err(|e| TokenError::RefreshFailed {
        message: e.to_string(),
    })?;

    let response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.expose().to_string()))
        .request_async(async_http_client)
        .await
        .map_err(|e| TokenError::RefreshFailed {
            message: format!("token refresh failed: {}", e),
        })?;

    Ok(token_from_response(&response, Some(refresh_token)))
}

fn token_from_response(response: &BasicTokenResponse, previous_refresh: Option<&Secret>) -> Token {
    let mut token = Token::new(response.access_token().secret().to_string())
        .with_type(response.token_type().as_ref());

    if let Some(duration) = response.expires_in() {
        if let Ok(duration) = chrono::Duration::from_std(duration) {
            token = token.with_expiry(Utc::now() + duration);
        }
    }

    match response.refresh_token() {
        Some(refresh) => token.with_refresh_token(refresh.secret().to_string()),
        None => match previous_refresh {
            Some(refresh) => token.with_refresh_token(refresh.expose().to_string()),
            None => token,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoint;

    fn test_config(auth_url: &str) -> OAuth2Config {
        OAuth2Config::new(
            "test-client-id",
            "test-secret",
            Endpoint::new(auth_url, "https://example.com/token"),
        )
        .with_redirect_url("http://localhost:8080/callback")
    }

    #[test]
    fn test_create_oauth_client() {
        let client = create_oauth_client(&test_config("https://example.com/auth"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_oauth_client_invalid_urls() {
        let client = create_oauth_client(&test_config("not a valid url"));
        assert!(matches!(client, Err(ClientError::OAuth { .. })));
    }

    #[test]
    fn test_create_oauth_client_without_auth_url() {
        let config = OAuth2Config::new(
            "token-only",
            "secret",
            Endpoint::new("", "https://example.com/token"),
        );
        assert!(create_oauth_client(&config).is_ok());
    }

    #[test]
    fn test_create_oauth_client_public_client() {
        let config = OAuth2Config::new(
            "public",
            "",
            Endpoint::new("https://example.com/auth", "https://example.com/token"),
        );
        assert!(create_oauth_client(&config).is_ok());
    }
}
