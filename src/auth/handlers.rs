//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use tracing::info;

use super::extractors::AuthedUser;
use super::models::{
    AuthResponse, ChangePasswordRequest, GoogleAuthRequest, LoginRequest, MessageResponse,
    PublicProfile, RegisterRequest, UpdateProfileRequest,
};
use super::validators::{
    ChangePasswordValidator, GoogleAuthValidator, LoginValidator, RegisterValidator,
    UpdateProfileValidator,
};
use crate::common::{ApiError, AppJson, AppState, Validator};

/// POST /auth/register
/// Creates a password account
///
/// # Request Body
/// ```json
/// {
///   "fname": "A", "lname": "B", "email": "a@b.com", "password": "secret",
///   "phone": "optional", "city": "optional", "country": "optional", "image": "optional"
/// }
/// ```
///
/// # Response (201)
/// ```json
/// { "id": "U_...", "fname": "A", "lname": "B", "email": "a@b.com", "phone": "",
///   "city": "Prayagraj", "country": "India", "image": "profile.jpg", "token": "<jwt>" }
/// ```
pub async fn register_handler(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let validation = RegisterValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let resp = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /auth/login
/// Password login; unknown email and wrong password give the same 401
pub async fn login_handler(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let validation = LoginValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let resp = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(resp))
}

/// POST /auth/google
/// Authenticates a user via a Google OAuth access token
///
/// # Request Body
/// ```json
/// { "access_token": "<google access token>" }
/// ```
pub async fn google_auth(
    Extension(state): Extension<AppState>,
    AppJson(payload): AppJson<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Received Google auth request");

    let validation = GoogleAuthValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let resp = state.auth.login_with_google(payload.access_token.trim()).await?;
    Ok(Json(resp))
}

/// POST /auth/logout
/// Logout endpoint - since we're using JWT tokens, logout is handled client-side
/// This endpoint just returns success to confirm the logout request
pub async fn logout_handler(Extension(state): Extension<AppState>) -> Json<MessageResponse> {
    info!("User logout requested");
    Json(state.auth.logout())
}

/// GET /auth/me
/// Returns the current authenticated user's profile
pub async fn me_handler(
    Extension(state): Extension<AppState>,
    authed: AuthedUser,
) -> Result<Json<PublicProfile>, ApiError> {
    let profile = state.auth.profile(&authed.id).await?;
    Ok(Json(profile))
}

/// PUT /auth/profile
/// Updates profile fields; the password is left untouched
pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    authed: AuthedUser,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<PublicProfile>, ApiError> {
    let validation = UpdateProfileValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let profile = state.auth.update_profile(&authed.id, payload).await?;
    Ok(Json(profile))
}

/// PUT /auth/password
pub async fn change_password_handler(
    Extension(state): Extension<AppState>,
    authed: AuthedUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let validation = ChangePasswordValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let resp = state
        .auth
        .change_password(&authed.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(resp))
}

/// GET /
pub async fn health_handler() -> &'static str {
    "Backend is running!"
}
