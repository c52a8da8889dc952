//! HTTP client for the auth API
//!
//! Persists credentials on successful sign-in, attaches the bearer token to
//! protected calls, and drops the session when the server rejects it.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::guard::RouteGuard;
use super::session::{SessionContext, SessionError};
use crate::auth::models::{
    AuthResponse, GoogleAuthRequest, LoginRequest, PublicProfile, RegisterRequest,
};
use crate::common::error::ErrorResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the stored token; the session has been cleared
    #[error("session expired, sign in again")]
    SessionExpired { redirect_to: String },

    /// No stored token for a protected call
    #[error("not signed in")]
    NotAuthenticated { redirect_to: String },

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from server: {0}")]
    InvalidResponse(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Where the UI should navigate, for errors that end the session
    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            ClientError::SessionExpired { redirect_to }
            | ClientError::NotAuthenticated { redirect_to } => Some(redirect_to),
            _ => None,
        }
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: SessionContext,
    guard: RouteGuard,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            guard: RouteGuard::default(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.authenticate("auth/register", req).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate("auth/login", &req).await
    }

    pub async fn login_with_google(&self, access_token: &str) -> Result<AuthResponse, ClientError> {
        let req = GoogleAuthRequest {
            access_token: access_token.to_string(),
        };
        self.authenticate("auth/google", &req).await
    }

    /// Tells the server, then drops the local session whatever it answered
    pub async fn logout(&self) -> Result<(), ClientError> {
        let mut request = self.http.post(self.url("auth/logout"));
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        if let Err(e) = request.send().await {
            warn!(error = %e, "Logout request failed, clearing session anyway");
        }
        self.session.clear()?;
        info!("Signed out");
        Ok(())
    }

    /// Current user's profile, `current_path` being the view that asked for it
    pub async fn me(&self, current_path: &str) -> Result<PublicProfile, ClientError> {
        self.get_protected("auth/me", current_path).await
    }

    pub async fn get_protected<T: DeserializeOwned>(
        &self,
        path: &str,
        current_path: &str,
    ) -> Result<T, ClientError> {
        let request = self.http.get(self.url(path));
        self.send_protected(request, current_path).await
    }

    pub async fn put_protected<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        current_path: &str,
    ) -> Result<T, ClientError> {
        let request = self.http.put(self.url(path)).json(body);
        self.send_protected(request, current_path).await
    }

    /// Sends `request` with the bearer token attached.
    ///
    /// A 401 means the token is invalid or expired: the session is cleared and
    /// the caller gets a redirect back to login for `current_path`.
    pub async fn send_protected<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        current_path: &str,
    ) -> Result<T, ClientError> {
        let token = self.session.token().ok_or_else(|| ClientError::NotAuthenticated {
            redirect_to: self.guard.login_redirect(current_path),
        })?;

        let resp = request.bearer_auth(token).send().await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the stored token, clearing session");
            self.session.clear()?;
            return Err(ClientError::SessionExpired {
                redirect_to: self.guard.login_redirect(current_path),
            });
        }

        let resp = error_for_status(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, ClientError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        let resp = error_for_status(resp).await?;

        let auth = resp
            .json::<AuthResponse>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        validate_auth_response(&auth)?;

        self.session.set_credentials(auth.clone())?;
        debug!(user_id = %auth.user.id, "Signed in");
        Ok(auth)
    }
}

/// A typed decode already guarantees the shape; this rejects empty identity fields
fn validate_auth_response(auth: &AuthResponse) -> Result<(), ClientError> {
    if auth.token.trim().is_empty() {
        return Err(ClientError::InvalidResponse("missing token".to_string()));
    }
    if auth.user.id.trim().is_empty() || auth.user.email.trim().is_empty() {
        return Err(ClientError::InvalidResponse(
            "profile missing id or email".to_string(),
        ));
    }
    Ok(())
}

/// Turns a non-2xx response into `ClientError::Api` using the `{message}` body
async fn error_for_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
