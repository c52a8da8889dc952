//! CarbonLens authentication backend and client session layer.
//!
//! The server side (`auth`, `common`, `services`) exposes the `/auth/*` REST
//! endpoints; `client` holds the credential persistence, route guard and API
//! client a front end uses against them.

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub mod auth;
pub mod client;
pub mod common;
pub mod logging_middleware;
pub mod services;

use auth::password::PasswordHasher;
use auth::repository::UserRepository;
use auth::token::TokenService;
use auth::AuthService;
use common::{AppConfig, AppState};
use services::IdentityProvider;

/// Wires the auth service from configuration, a database pool and an identity provider
pub fn build_state(
    config: &AppConfig,
    pool: sqlx::SqlitePool,
    identity: Arc<dyn IdentityProvider>,
) -> AppState {
    let hasher = PasswordHasher::new(config.bcrypt_cost);
    let users = UserRepository::new(pool, hasher.clone());
    let tokens = TokenService::new(&config.jwt_secret);
    AppState::new(AuthService::new(users, hasher, tokens, identity))
}

/// CORS restricted to the configured origin allow-list
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Composes the application router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(auth::handlers::health_handler))
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
