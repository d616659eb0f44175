//! XChaCha20-Poly1305 token store with optional JSON persistence.
//!
//! Each entry is sealed independently: `base64(nonce || ciphertext)` over a
//! small JSON payload holding the access/refresh pair. The file on disk only
//! ever contains sealed entries, and is replaced via temp file + rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    XChaCha20Poly1305, XNonce,
};
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use camp_core::config::TokenStoreConfig;
use camp_core::utils::expand_home;

use crate::store::{TokenInfo, TokenPair, TokenStore, TokenStoreError};

const NONCE_SIZE: usize = 24;
const KEY_SIZE: usize = 32;
const FILE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SealedEntry {
    provider: String,
    account: String,
    sealed: String,
    expires_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: Vec<SealedEntry>,
}

#[derive(Serialize, Deserialize)]
struct PlainPair {
    access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

fn entry_key(provider: &str, account: &str) -> String {
    format!("{}/{}", provider.trim().to_lowercase(), account.trim())
}

pub struct EncryptedTokenStore {
    cipher: XChaCha20Poly1305,
    path: Option<PathBuf>,
    entries: RwLock<BTreeMap<String, SealedEntry>>,
}

impl std::fmt::Debug for EncryptedTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedTokenStore")
            .field("cipher", &"[XChaCha20Poly1305]")
            .field("path", &self.path)
            .finish()
    }
}

impl EncryptedTokenStore {
    /// In-memory store. `key` must be exactly 32 bytes.
    pub fn in_memory(key: &[u8]) -> Result<Self, TokenStoreError> {
        if key.len() != KEY_SIZE {
            return Err(TokenStoreError::InvalidKey(format!(
                "key must be {KEY_SIZE} bytes, got {}",
                key.len()
            )));
        }
        let cipher = XChaCha20Poly1305::new_from_slice(key)
            .map_err(|e| TokenStoreError::InvalidKey(e.to_string()))?;
        Ok(Self {
            cipher,
            path: None,
            entries: RwLock::new(BTreeMap::new()),
        })
    }

    /// Persistent store backed by `path`, loading existing entries if the file exists.
    pub async fn open(key: &[u8], path: impl Into<PathBuf>) -> Result<Self, TokenStoreError> {
        let mut store = Self::in_memory(key)?;
        let path = path.into();

        if path.exists() {
            let raw = tokio::fs::read_to_string(&path).await?;
            let file: StoreFile = serde_json::from_str(&raw)
                .map_err(|e| TokenStoreError::Corrupt(e.to_string()))?;
            if file.version != FILE_VERSION {
                return Err(TokenStoreError::Corrupt(format!(
                    "unsupported version {}",
                    file.version
                )));
            }
            let entries = file
                .entries
                .into_iter()
                .map(|e| (entry_key(&e.provider, &e.account), e))
                .collect::<BTreeMap<_, _>>();
            debug!(path = %path.display(), entries = entries.len(), "Token store loaded");
            store.entries = RwLock::new(entries);
        }

        store.path = Some(path);
        Ok(store)
    }

    /// Build from config. `None` when no key file is configured.
    pub async fn from_config(config: &TokenStoreConfig) -> Result<Option<Self>, TokenStoreError> {
        if !config.is_configured() {
            return Ok(None);
        }
        let key = read_key_file(&expand_home(&config.key_file))?;
        let store = Self::open(&key, expand_home(&config.store_path)).await?;
        info!("Integration token store ready");
        Ok(Some(store))
    }

    /// Fresh random 32-byte key.
    pub fn generate_key() -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Write a new base64 key to `path`. Refuses to overwrite an existing key.
    pub fn create_key_file(path: &Path) -> Result<(), TokenStoreError> {
        if path.exists() {
            return Err(TokenStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("key file {} already exists", path.display()),
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, STANDARD.encode(Self::generate_key()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn seal(&self, pair: &TokenPair) -> Result<String, TokenStoreError> {
        let plain = serde_json::to_vec(&PlainPair {
            access: pair.access.expose_secret().to_string(),
            refresh: pair.refresh.as_ref().map(|r| r.expose_secret().to_string()),
        })
        .map_err(|_| TokenStoreError::Encrypt)?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), plain.as_slice())
            .map_err(|_| TokenStoreError::Encrypt)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn open_sealed(&self, sealed: &str) -> Result<TokenPair, TokenStoreError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|e| TokenStoreError::Corrupt(e.to_string()))?;
        if bytes.len() < NONCE_SIZE {
            return Err(TokenStoreError::Corrupt("sealed entry too short".into()));
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
        let plain = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenStoreError::Decrypt)?;
        let pair: PlainPair =
            serde_json::from_slice(&plain).map_err(|e| TokenStoreError::Corrupt(e.to_string()))?;
        Ok(TokenPair::new(pair.access, pair.refresh))
    }

    async fn persist(&self, entries: &BTreeMap<String, SealedEntry>) -> Result<(), TokenStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = StoreFile {
            version: FILE_VERSION,
            entries: entries.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TokenStoreError::Corrupt(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            warn!(path = %path.display(), error = %e, "Token store write failed");
            return Err(e.into());
        }
        Ok(())
    }

    /// Seal, persist the next state, then swap it in under the same write lock.
    async fn put(
        &self,
        provider: &str,
        account: &str,
        pair: &TokenPair,
        expires_at: Option<DateTime<Utc>>,
        must_exist: bool,
    ) -> Result<(), TokenStoreError> {
        let key = entry_key(provider, account);
        let sealed = self.seal(pair)?;

        let mut guard = self.entries.write().await;
        if must_exist && !guard.contains_key(&key) {
            return Err(TokenStoreError::NotFound {
                provider: provider.to_string(),
                account: account.to_string(),
            });
        }
        let mut next = guard.clone();
        next.insert(
            key,
            SealedEntry {
                provider: provider.trim().to_lowercase(),
                account: account.trim().to_string(),
                sealed,
                expires_at,
                updated_at: Utc::now(),
            },
        );
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn entry(&self, provider: &str, account: &str) -> Result<SealedEntry, TokenStoreError> {
        self.entries
            .read()
            .await
            .get(&entry_key(provider, account))
            .cloned()
            .ok_or_else(|| TokenStoreError::NotFound {
                provider: provider.to_string(),
                account: account.to_string(),
            })
    }
}

/// Accepts either 32 raw bytes or the base64 text written by `create_key_file`.
fn read_key_file(path: &Path) -> Result<Vec<u8>, TokenStoreError> {
    let raw = std::fs::read(path).map_err(|e| {
        TokenStoreError::InvalidKey(format!("cannot read key file {}: {e}", path.display()))
    })?;
    if raw.len() == KEY_SIZE {
        return Ok(raw);
    }
    let text = String::from_utf8_lossy(&raw);
    STANDARD
        .decode(text.trim())
        .map_err(|e| TokenStoreError::InvalidKey(format!("key file is not base64: {e}")))
}

#[async_trait]
impl TokenStore for EncryptedTokenStore {
    async fn store(
        &self,
        provider: &str,
        account: &str,
        pair: TokenPair,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), TokenStoreError> {
        self.put(provider, account, &pair, expires_at, false).await?;
        debug!(provider, account, "Integration token stored");
        Ok(())
    }

    async fn fetch(&self, provider: &str, account: &str) -> Result<TokenPair, TokenStoreError> {
        let entry = self.entry(provider, account).await?;
        self.open_sealed(&entry.sealed)
    }

    async fn is_expired(&self, provider: &str, account: &str) -> Result<bool, TokenStoreError> {
        let entry = self.entry(provider, account).await?;
        Ok(entry.expires_at.is_some_and(|exp| exp <= Utc::now()))
    }

    async fn rotate(
        &self,
        provider: &str,
        account: &str,
        pair: TokenPair,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), TokenStoreError> {
        self.put(provider, account, &pair, expires_at, true).await?;
        info!(provider, account, "Integration token rotated");
        Ok(())
    }

    async fn list(&self) -> Vec<TokenInfo> {
        self.entries
            .read()
            .await
            .values()
            .map(|e| TokenInfo {
                provider: e.provider.clone(),
                account: e.account.clone(),
                expires_at: e.expires_at,
                updated_at: e.updated_at,
            })
            .collect()
    }
}
