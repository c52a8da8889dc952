// src/services/identity.rs
//! Federated identity provider seam

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderAuthError {
    #[error("identity provider rejected the access token (HTTP {0})")]
    Rejected(u16),

    #[error("identity provider request timed out")]
    Timeout,

    #[error("identity provider request failed: {0}")]
    Transport(String),

    #[error("identity provider response malformed: {0}")]
    Malformed(String),

    #[error("identity provider returned no email")]
    MissingEmail,
}

/// Normalized profile claims returned by an identity provider.
///
/// Transient: used to find or create a local account, never stored as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedClaims {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub picture: Option<String>,
}

/// Exchanges a provider access token for verified profile claims
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name, recorded on accounts it creates
    fn name(&self) -> &'static str;

    async fn fetch_claims(&self, access_token: &str) -> Result<FederatedClaims, ProviderAuthError>;
}
