//! # Client Module
//!
//! Client side of the credential lifecycle:
//! - `session`: persisted `{user, token}` record behind a swappable store
//! - `guard`: admits or redirects navigation to protected views
//! - `api`: auth API calls, bearer injection and reaction to rejected tokens

pub mod api;
pub mod guard;
pub mod session;

#[cfg(test)]
mod tests;

pub use api::{ApiClient, ClientError};
pub use guard::{Navigation, RouteGuard};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionContext, SessionError, SessionStore,
    StoredSession,
};
