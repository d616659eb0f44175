//! Token store trait and the values that cross it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

/// Access token plus optional refresh token. Values never appear in `Debug`.
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: Option<SecretString>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: refresh.map(SecretString::from),
        }
    }

    pub fn access_token(&self) -> &str {
        self.access.expose_secret()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_ref().map(|r| r.expose_secret())
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Non-secret description of one stored integration token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub provider: String,
    pub account: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("no token stored for {provider}/{account}")]
    NotFound { provider: String, account: String },

    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("token encryption failed")]
    Encrypt,

    #[error("token decryption failed (wrong key or corrupted entry)")]
    Decrypt,

    #[error("token store file is corrupt: {0}")]
    Corrupt(String),

    #[error("token store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keyed by (provider, account). Implementations must keep values encrypted
/// at rest and make `rotate` all-or-nothing.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert or replace the pair for (provider, account).
    async fn store(
        &self,
        provider: &str,
        account: &str,
        pair: TokenPair,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), TokenStoreError>;

    async fn fetch(&self, provider: &str, account: &str) -> Result<TokenPair, TokenStoreError>;

    /// `true` once the expiry has passed; tokens without expiry never expire.
    async fn is_expired(&self, provider: &str, account: &str) -> Result<bool, TokenStoreError>;

    /// Replace an existing pair. Fails with `NotFound` if nothing is stored.
    async fn rotate(
        &self,
        provider: &str,
        account: &str,
        pair: TokenPair,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), TokenStoreError>;

    /// Every stored entry, secrets omitted.
    async fn list(&self) -> Vec<TokenInfo>;
}
