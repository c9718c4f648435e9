//! Integration tests for loading configuration from files and environment pairs.

use std::io::Write;

use authmesh_core::credentials::{parse_from_env_with, DEFAULT_CREDENTIALS_ENV, DEFAULT_SCOPES_ENV};
use authmesh_core::{ConfigMoreSet, CredentialsError, Endpoint, parse_from_file};

const INSTALLED: &str = r#"{"installed":{
    "client_id":"file-id","client_secret":"file-secret",
    "auth_uri":"https://accounts.example.com/o/oauth2/auth",
    "token_uri":"https://accounts.example.com/o/oauth2/token",
    "redirect_uris":["urn:ietf:wg:oauth:2.0:oob"]}}"#;

#[test]
fn test_parse_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(INSTALLED.as_bytes()).unwrap();

    let config = parse_from_file(file.path(), &["email".to_string()]).unwrap();

    assert_eq!(config.client_id, "file-id");
    assert_eq!(config.client_secret.expose(), "file-secret");
    assert_eq!(config.scopes, vec!["email"]);
    assert_eq!(
        config.endpoint.token_url,
        "https://accounts.example.com/o/oauth2/token"
    );
}

#[test]
fn test_parse_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_from_file(dir.path().join("absent.json"), &[]);
    assert!(matches!(result, Err(CredentialsError::Io { .. })));
}

#[test]
fn test_parse_from_env_defaults() {
    let lookup = |name: &str| match name {
        n if n == DEFAULT_CREDENTIALS_ENV => Some(INSTALLED.to_string()),
        n if n == DEFAULT_SCOPES_ENV => Some("openid, email,,profile".to_string()),
        _ => None,
    };

    let config = parse_from_env_with(lookup, "", &[]).unwrap();

    assert_eq!(config.client_id, "file-id");
    assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
}

#[test]
fn test_parse_from_env_unset_variable() {
    let result = parse_from_env_with(|_| None, "MY_CREDS", &[]);
    assert!(matches!(result, Err(CredentialsError::Empty)));
}

#[test]
fn test_config_set_from_env_pairs() {
    let set = ConfigMoreSet::new();
    let env = vec![
        ("SVC_OAUTH_google", INSTALLED.to_string()),
        (
            "SVC_OAUTH_facebook",
            r#"{"web":{"service":"facebook","client_id":"fb"}}"#.to_string(),
        ),
        ("PATH", "/usr/bin".to_string()),
    ];

    set.populate_from_env(env, "SVC_OAUTH_").unwrap();

    assert_eq!(set.keys(), vec!["facebook", "google"]);
    assert_eq!(set.config("facebook").unwrap().endpoint, Endpoint::facebook());
    assert_eq!(set.config("google").unwrap().client_id, "file-id");
}
