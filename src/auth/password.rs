//! bcrypt password hashing
//!
//! Hashing is deliberately slow. The async variants move the work onto the
//! blocking pool so request handling threads stay free.

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::debug;

use crate::common::generate_raw_id;

/// Prefix of the password value stored for federated accounts.
///
/// The full sentinel is not a bcrypt hash, so `verify` rejects every
/// plaintext against it.
pub const FEDERATED_SENTINEL_PREFIX: &str = "!federated$";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What to store in the password column of a new user
#[derive(Debug, Clone)]
pub enum PasswordInput {
    /// Hashed before it is written
    Plain(String),
    /// Non-loginable marker for accounts created through a federated provider
    FederatedSentinel,
}

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// True iff `plaintext` matches `hash`. A stored value that is not a
    /// bcrypt hash never matches.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(error = %e, "Stored password is not a verifiable hash");
                false
            }
        }
    }

    pub async fn hash_async(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext)).await?
    }

    pub async fn verify_async(&self, plaintext: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash)).await?)
    }

    /// Burns the same CPU as a real verification. Used when the account does
    /// not exist, so response time does not reveal whether an email is registered.
    pub async fn verify_dummy(&self, plaintext: String) -> Result<(), PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || {
            let dummy = match hasher.dummy_hash.get() {
                Some(hash) => hash.clone(),
                None => {
                    let hash = hasher.hash(&generate_raw_id(32))?;
                    hasher.dummy_hash.get_or_init(|| hash).clone()
                }
            };
            hasher.verify(&plaintext, &dummy);
            Ok::<(), PasswordError>(())
        })
        .await?
    }

    /// Resolves a [`PasswordInput`] to the value persisted in the password column
    pub async fn materialize(&self, input: PasswordInput) -> Result<String, PasswordError> {
        match input {
            PasswordInput::Plain(plaintext) => self.hash_async(plaintext).await,
            PasswordInput::FederatedSentinel => Ok(federated_sentinel()),
        }
    }
}

/// A fresh random sentinel for a federated account's password column
pub fn federated_sentinel() -> String {
    format!("{}{}", FEDERATED_SENTINEL_PREFIX, generate_raw_id(32))
}
