//! Client factories, one per credential shape.
//!
//! Every factory takes [`ClientOptions`] explicitly; certificate
//! verification is only skipped when the options ask for it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use super::{ClientError, ClientOptions, HttpClient, TlsConfig, build_http};
use crate::config::OAuth2Config;
use crate::model::AuthorizationType;
use crate::oauth;
use crate::token::Token;

/// Build a client sending `Authorization: <token_type> <token_value>`.
pub fn new_client_token(
    token_type: &str,
    token_value: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        sensitive_value(AUTHORIZATION.as_str(), &format!("{} {}", token_type, token_value))?,
    );

    tracing::debug!(token_type, "Built static token client");
    Ok(HttpClient::with_static_auth(build_http(opts, headers)?))
}

/// Like [`new_client_token`], base64-encoding the token value first.
pub fn new_client_token_base64(
    token_type: &str,
    token_value: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    new_client_token(token_type, &STANDARD.encode(token_value.as_bytes()), opts)
}

/// Build a client using HTTP basic authentication.
pub fn new_client_basic_auth(
    username: &str,
    password: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    new_client_token_base64(
        AuthorizationType::Basic.as_str(),
        &format!("{}:{}", username, password),
        opts,
    )
}

/// Build a client sending a fixed set of headers on every request.
pub fn new_client_headers(
    headers: &HashMap<String, String>,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidHeader {
                name: name.clone(),
            })?;
        map.insert(header_name, sensitive_value(name, value)?);
    }

    tracing::debug!(count = map.len(), "Built static header client");
    Ok(HttpClient::with_static_auth(build_http(opts, map)?))
}

/// Build a client from a token type and access token.
///
/// Both values are trimmed and the token never expires.
pub fn new_client_authz_token_simple(
    token_type: &str,
    access_token: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let token = Token::new(access_token.trim()).with_type(token_type.trim());
    new_client_oauth2_token(token, opts)
}

/// Build a client from an OAuth2 token without refresh support.
pub fn new_client_oauth2_token(token: Token, opts: &ClientOptions) -> Result<HttpClient, ClientError> {
    Ok(HttpClient::with_token(build_http(opts, HeaderMap::new())?, token, None))
}

/// Build a client from a JSON token document.
pub fn new_client_token_json(
    token_json: &[u8],
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let token: Token = serde_json::from_slice(token_json)?;
    new_client_oauth2_token(token, opts)
}

/// Build a client from either a bare bearer token or a JSON token document.
///
/// Input starting with `{` after trimming is treated as JSON.
pub fn new_client_bearer_token_simple_or_json(
    token_or_json: &[u8],
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let text = String::from_utf8_lossy(token_or_json);
    let text = text.trim();

    if text.is_empty() {
        Err(ClientError::EmptyToken)
    } else if text.starts_with('{') {
        new_client_token_json(text.as_bytes(), opts)
    } else {
        new_client_authz_token_simple(AuthorizationType::Bearer.as_str(), text, opts)
    }
}

/// Build a token client bound to custom TLS material.
pub fn new_client_tls_token(
    token: Token,
    tls: TlsConfig,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let opts = opts.clone().with_tls(tls);
    new_client_oauth2_token(token, &opts)
}

/// Build a client from an OAuth2 token and the config that issued it.
///
/// The config lets the client refresh the token once it expires.
pub fn new_client_config_token(
    config: &OAuth2Config,
    token: Token,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    Ok(HttpClient::with_token(
        build_http(opts, HeaderMap::new())?,
        token,
        Some(config.clone()),
    ))
}

/// Run the password grant and build a client from the issued token.
pub async fn new_client_password(
    config: &OAuth2Config,
    username: &str,
    password: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let token = oauth::exchange_password(config, username, password).await?;
    new_client_config_token(config, token, opts)
}

/// Exchange an authorization code and build a client from the issued token.
pub async fn new_client_auth_code(
    config: &OAuth2Config,
    auth_code: &str,
    opts: &ClientOptions,
) -> Result<HttpClient, ClientError> {
    let token = oauth::exchange_code(config, auth_code).await?;
    new_client_config_token(config, token, opts)
}

fn sensitive_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    let mut header = HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader {
        name: name.to_string(),
    })?;
    if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
        header.set_sensitive(true);
    }
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_or_json_rejects_empty() {
        let result = new_client_bearer_token_simple_or_json(b"  \n ", &ClientOptions::default());
        assert!(matches!(result, Err(ClientError::EmptyToken)));
    }

    #[test]
    fn test_bearer_or_json_rejects_bad_json() {
        let result = new_client_bearer_token_simple_or_json(b"{oops", &ClientOptions::default());
        assert!(matches!(result, Err(ClientError::Json(_))));
    }

    #[tokio::test]
    async fn test_bearer_or_json_detects_json() {
        let client = new_client_bearer_token_simple_or_json(
            br#" {"access_token":"from-json","token_type":"bearer"} "#,
            &ClientOptions::default(),
        )
        .unwrap();

        let token = client.token().await.unwrap();
        assert_eq!(token.access_token.expose(), "from-json");
    }

    #[tokio::test]
    async fn test_bearer_or_json_plain_token_is_trimmed() {
        let client =
            new_client_bearer_token_simple_or_json(b"  plain-token\n", &ClientOptions::default())
                .unwrap();

        let token = client.token().await.unwrap();
        assert_eq!(token.authorization_value(), "Bearer plain-token");
    }

    #[test]
    fn test_headers_rejects_invalid_name() {
        let headers = HashMap::from([("bad header".to_string(), "v".to_string())]);
        let result = new_client_headers(&headers, &ClientOptions::default());
        assert!(matches!(result, Err(ClientError::InvalidHeader { name }) if name == "bad header"));
    }

    #[test]
    fn test_token_rejects_invalid_value() {
        let result = new_client_token("Bearer", "line\nbreak", &ClientOptions::default());
        assert!(matches!(result, Err(ClientError::InvalidHeader { .. })));
    }

    #[test]
    fn test_insecure_client_builds() {
        assert!(new_client_token("Bearer", "t", &ClientOptions::insecure()).is_ok());
    }
}
