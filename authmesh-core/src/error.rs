//! Top-level error type for authmesh.

use thiserror::Error;

use crate::client::ClientError;
use crate::config_set::ConfigSetError;
use crate::credentials::CredentialsError;
use crate::manager::ManagerError;
use crate::provider::ProviderError;
use crate::token::TokenError;

/// Error type covering every authmesh operation.
///
/// Each module returns its own error; this enum lets callers mixing several
/// modules use a single `?` target.
#[derive(Debug, Error)]
pub enum AuthmeshError {
    #[error("credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("config error: {0}")]
    ConfigSet(#[from] ConfigSetError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// Convenience result alias.
pub type Result<T, E = AuthmeshError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_module_errors() {
        let err: AuthmeshError = TokenError::NotFound {
            key: "svc".to_string(),
        }
        .into();
        assert!(matches!(err, AuthmeshError::Token(_)));
        assert_eq!(err.to_string(), "token error: no token available for service key 'svc'");
    }
}
