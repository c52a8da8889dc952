// Application state shared across all modules

use std::sync::Arc;

use crate::auth::service::AuthService;

/// Application state handed to handlers and extractors through an `Extension` layer
///
/// Holds no mutable data of its own; the credential store behind the auth
/// service is the only shared state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}
