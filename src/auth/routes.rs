//! Authentication routes

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/register` - Password registration
/// - `POST /auth/login` - Password login
/// - `POST /auth/google` - Google access-token login
/// - `POST /auth/logout` - Logout (client-side token removal)
/// - `GET /auth/me` - Current user's profile
/// - `PUT /auth/profile` - Update profile fields
/// - `PUT /auth/password` - Change password
pub fn auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register_handler))
        .route("/auth/login", post(handlers::login_handler))
        .route("/auth/google", post(handlers::google_auth))
        .route("/auth/logout", post(handlers::logout_handler))
        .route("/auth/me", get(handlers::me_handler))
        .route("/auth/profile", put(handlers::update_profile_handler))
        .route("/auth/password", put(handlers::change_password_handler))
}
