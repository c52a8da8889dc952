// src/services/mod.rs
//
// Clients for external services used by the auth flows

pub mod google;
pub mod identity;

pub use google::GoogleIdentityProvider;
pub use identity::{FederatedClaims, IdentityProvider, ProviderAuthError};
