//! Authentication data models
//!
//! `PublicProfile` and `AuthResponse` are the wire contract shared by the
//! server handlers and the client in `crate::client`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// City stored when registration or the identity provider supplies none
pub const DEFAULT_CITY: &str = "Prayagraj";
/// Country stored when registration or the identity provider supplies none
pub const DEFAULT_COUNTRY: &str = "India";
/// Image reference stored when no picture is supplied
pub const DEFAULT_IMAGE: &str = "profile.jpg";

pub const PROVIDER_LOCAL: &str = "local";
pub const PROVIDER_GOOGLE: &str = "google";

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// User database model
///
/// Deliberately not `Serialize`: the password hash must never be written to a
/// response. Use [`User::to_public`] instead.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub image: String,
    pub provider: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn to_public(&self) -> PublicProfile {
        PublicProfile {
            id: self.id.clone(),
            fname: self.fname.clone(),
            lname: self.lname.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            image: self.image.clone(),
        }
    }
}

/// Public profile returned by every auth endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicProfile {
    pub id: String,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub image: String,
}

/// Register/login/google response: the public profile plus a bearer token, flattened
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: PublicProfile,
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/register body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// POST /auth/login body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/google body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GoogleAuthRequest {
    pub access_token: String,
}

/// PUT /auth/profile body; absent fields are left unchanged
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// PUT /auth/password body
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
