//! # authmesh core
//!
//! Multi-provider OAuth2 credential, token and HTTP client management.
//!
//! This crate provides:
//! - Parsers for provider credential documents (`web` / `installed` JSON)
//! - [`ConfigMoreSet`], a keyed registry of client configurations
//! - [`TokenSet`], keyed token storage with an in-memory implementation
//! - [`OAuth2Manager`], which builds authenticated clients per service key
//! - Client factories for static tokens, basic auth, headers and OAuth2 grants
//! - Provider capabilities that normalize the current user into SCIM form
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use authmesh_core::{ConfigMoreSet, MemoryTokenSet, OAuth2Manager};
//! use std::sync::Arc;
//!
//! let configs = Arc::new(ConfigMoreSet::from_env("APP_OAUTH_")?);
//! let manager = OAuth2Manager::new(configs, Arc::new(MemoryTokenSet::new()));
//! let client = manager.get_client("crm").await?;
//! ```

pub mod client;
pub mod config;
pub mod config_set;
pub mod credentials;
pub mod error;
pub mod manager;
pub mod model;
pub mod oauth;
pub mod provider;
pub mod secret;
pub mod store;
pub mod token;

pub use client::{ClientError, ClientOptions, HttpClient, TlsConfig};

pub use config::{Endpoint, OAuth2Config};

pub use config_set::{ConfigMoreSet, ConfigSetError};

pub use credentials::{
    AppCredentials,
    CredentialsEnvelope,
    CredentialsError,
    parse_from_bytes,
    parse_from_env,
    parse_from_file,
};

pub use error::AuthmeshError;

pub use manager::{ManagerError, OAuth2Manager};

pub use model::{ApplicationCredentials, AuthorizationType, UserCredentials};

pub use provider::{OAuth2Util, ProviderError, ProviderRegistry, ProviderType, ScimUser};

pub use secret::Secret;

pub use store::MemoryTokenSet;

pub use token::{Token, TokenError, TokenSet};
