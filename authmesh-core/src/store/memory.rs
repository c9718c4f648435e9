//! In-memory token storage implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::token::{Token, TokenError, TokenSet};

/// In-memory token set.
///
/// This store is not persistent; tokens are lost when the process exits.
///
/// # Thread Safety
///
/// Reads and writes are serialized through a `RwLock`, so the store can be
/// shared across request handlers behind an `Arc`.
pub struct MemoryTokenSet {
    tokens: RwLock<HashMap<String, Token>>,
}

impl MemoryTokenSet {
    /// Create a new empty token set.
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Create a token set with initial tokens.
    pub fn with_tokens(tokens: HashMap<String, Token>) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Remove the token stored under `key`, returning it if present.
    pub fn remove_token(&self, key: &str) -> Option<Token> {
        self.tokens.write().remove(key)
    }

    /// All keys that currently hold a token, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.tokens.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored tokens.
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Whether the set holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

impl Default for MemoryTokenSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryTokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenSet")
            .field("keys_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl TokenSet for MemoryTokenSet {
    async fn get_token(&self, key: &str) -> Result<Token, TokenError> {
        self.tokens
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| TokenError::NotFound {
                key: key.to_string(),
            })
    }

    async fn set_token(&self, key: &str, token: Token) -> Result<(), TokenError> {
        self.tokens.write().insert(key.to_string(), token);
        tracing::debug!(key, "Stored token");
        Ok(())
    }
}
