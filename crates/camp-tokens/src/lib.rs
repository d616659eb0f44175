//! Camp Tokens — OAuth credentials for social publishers, encrypted at rest.

pub mod encrypted;
pub mod store;

pub use encrypted::EncryptedTokenStore;
pub use store::{TokenInfo, TokenPair, TokenStore, TokenStoreError};
