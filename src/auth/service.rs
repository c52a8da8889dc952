//! Auth service: registration, password login, federated login, logout
//!
//! Every operation is an independent unit of work against the credential
//! store. Tokens are stateless, so nothing here tracks sessions.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use super::models::{
    AuthResponse, MessageResponse, PublicProfile, RegisterRequest, UpdateProfileRequest, User,
    DEFAULT_CITY, DEFAULT_COUNTRY, DEFAULT_IMAGE, PROVIDER_LOCAL,
};
use super::password::{PasswordError, PasswordHasher, PasswordInput};
use super::repository::{NewUser, RepositoryError, UserRepository};
use super::token::{TokenError, TokenService};
use crate::common::{safe_email_log, ApiError};
use crate::services::{FederatedClaims, IdentityProvider, ProviderAuthError};

pub const LOGOUT_MESSAGE: &str = "Logged out Successfully";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// Unknown email and wrong password both map here
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("federated login failed: {0}")]
    FederatedAuthFailure(String),

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::Internal(e.to_string())
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DuplicateEmail => AuthError::DuplicateEmail,
            RepositoryError::NotFound => AuthError::Internal("user record vanished".to_string()),
            RepositoryError::Password(e) => e.into(),
            RepositoryError::Database(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<ProviderAuthError> for AuthError {
    fn from(e: ProviderAuthError) -> Self {
        AuthError::FederatedAuthFailure(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DuplicateEmail => ApiError::DuplicateEmail,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::FederatedAuthFailure(_) => ApiError::FederatedAuthFailure,
            AuthError::InvalidToken => ApiError::InvalidToken,
            AuthError::ExpiredToken => ApiError::ExpiredToken,
            AuthError::Internal(msg) => ApiError::InternalServer(msg),
        }
    }
}

pub struct AuthService {
    users: UserRepository,
    hasher: PasswordHasher,
    tokens: TokenService,
    identity: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(
        users: UserRepository,
        hasher: PasswordHasher,
        tokens: TokenService,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            identity,
        }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    fn respond(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self.tokens.issue(&user.id)?;
        Ok(AuthResponse {
            user: user.to_public(),
            token,
        })
    }

    /// Creates a password account and signs it in.
    ///
    /// Expects a request that already passed `RegisterValidator`.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let new_user = NewUser {
            fname: req.fname.trim().to_string(),
            lname: req.lname.trim().to_string(),
            email: req.email.trim().to_string(),
            password: PasswordInput::Plain(req.password),
            phone: or_default(req.phone, ""),
            city: or_default(req.city, DEFAULT_CITY),
            country: or_default(req.country, DEFAULT_COUNTRY),
            image: or_default(req.image, DEFAULT_IMAGE),
            provider: PROVIDER_LOCAL.to_string(),
        };

        let user = self.users.create(new_user).await.map_err(|e| {
            if matches!(e, RepositoryError::DuplicateEmail) {
                warn!(email = %safe_email_log(&req.email), "Registration rejected: email already registered");
            }
            AuthError::from(e)
        })?;

        info!(user_id = %user.id, email = %safe_email_log(&user.email), "User registered");
        self.respond(&user)
    }

    /// Password login. Never mutates state.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = email.trim();
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(password.to_string()).await?;
                warn!(email = %safe_email_log(email), "Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches = self
            .hasher
            .verify_async(password.to_string(), user.password.clone())
            .await?;
        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, email = %safe_email_log(&user.email), "User logged in");
        self.respond(&user)
    }

    /// Resolves a provider access token and signs in the matching local account,
    /// creating it on first use.
    ///
    /// An existing account with the same email is reused as is; its profile is
    /// not refreshed from the provider.
    pub async fn login_with_google(&self, access_token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.identity.fetch_claims(access_token).await.map_err(|e| {
            warn!(error = %e, provider = self.identity.name(), "Federated login failed at provider");
            AuthError::from(e)
        })?;

        let (user, created) = self
            .users
            .find_or_create(self.federated_user(&claims))
            .await
            .map_err(|e| {
                error!(error = %e, email = %safe_email_log(&claims.email), "Federated login failed at lookup");
                AuthError::FederatedAuthFailure(e.to_string())
            })?;

        info!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            provider = self.identity.name(),
            created,
            "User authenticated via federated login"
        );
        self.respond(&user)
    }

    fn federated_user(&self, claims: &FederatedClaims) -> NewUser {
        NewUser {
            fname: claims.given_name.clone(),
            lname: claims.family_name.clone(),
            email: claims.email.clone(),
            password: PasswordInput::FederatedSentinel,
            phone: String::new(),
            city: DEFAULT_CITY.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            image: claims
                .picture
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            provider: self.identity.name().to_string(),
        }
    }

    /// Nothing to clear server side; the client discards its token.
    pub fn logout(&self) -> MessageResponse {
        MessageResponse {
            message: LOGOUT_MESSAGE.to_string(),
        }
    }

    /// Maps a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let subject = self.tokens.verify(token)?;
        match self.users.find_by_id(&subject).await? {
            Some(user) => Ok(user),
            None => {
                warn!(user_id = %subject, "Token subject has no matching user");
                Err(AuthError::InvalidToken)
            }
        }
    }

    pub async fn profile(&self, user_id: &str) -> Result<PublicProfile, AuthError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.to_public()),
            None => Err(AuthError::InvalidToken),
        }
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: UpdateProfileRequest,
    ) -> Result<PublicProfile, AuthError> {
        let update = UpdateProfileRequest {
            fname: update.fname.map(|v| v.trim().to_string()),
            lname: update.lname.map(|v| v.trim().to_string()),
            phone: update.phone.map(|v| v.trim().to_string()),
            city: update.city.map(|v| v.trim().to_string()),
            country: update.country.map(|v| v.trim().to_string()),
            image: update.image.map(|v| v.trim().to_string()),
        };
        let user = self.users.update_profile(user_id, &update).await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user.to_public())
    }

    /// Requires the current password; federated accounts have none and always fail.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let matches = self
            .hasher
            .verify_async(current_password.to_string(), user.password.clone())
            .await?;
        if !matches {
            warn!(user_id = %user.id, "Password change rejected: wrong current password");
            return Err(AuthError::InvalidCredentials);
        }

        self.users
            .change_password(&user.id, new_password.to_string())
            .await?;

        Ok(MessageResponse {
            message: "Password updated".to_string(),
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
