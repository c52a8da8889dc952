// src/services/google.rs
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::identity::{FederatedClaims, IdentityProvider, ProviderAuthError};
use crate::auth::models::PROVIDER_GOOGLE;
use crate::common::safe_email_log;

/// Raw payload of Google's OAuth2 v3 userinfo endpoint
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl GoogleUserInfo {
    fn normalize(self) -> Result<FederatedClaims, ProviderAuthError> {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(ProviderAuthError::MissingEmail)?;

        let given_name = non_blank(self.given_name).unwrap_or_else(|| {
            email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });
        let family_name = non_blank(self.family_name).unwrap_or_default();

        Ok(FederatedClaims {
            email,
            given_name,
            family_name,
            picture: non_blank(self.picture),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves Google access tokens through the userinfo endpoint
#[derive(Clone)]
pub struct GoogleIdentityProvider {
    http: Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    /// Every request is bounded by `timeout`; a provider that hangs fails the
    /// login instead of the request.
    pub fn new(userinfo_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            userinfo_url: userinfo_url.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn name(&self) -> &'static str {
        PROVIDER_GOOGLE
    }

    async fn fetch_claims(&self, access_token: &str) -> Result<FederatedClaims, ProviderAuthError> {
        debug!("Requesting Google userinfo");

        let resp = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(endpoint = %self.userinfo_url, "Google userinfo request timed out");
                    ProviderAuthError::Timeout
                } else {
                    error!(error = %e, endpoint = %self.userinfo_url, "HTTP error contacting Google userinfo endpoint");
                    ProviderAuthError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    warn!(http_status = %status, "Google rejected the access token")
                }
                _ => warn!(http_status = %status, "Google userinfo returned error status"),
            }
            return Err(ProviderAuthError::Rejected(status.as_u16()));
        }

        let info = resp.json::<GoogleUserInfo>().await.map_err(|e| {
            if e.is_timeout() {
                ProviderAuthError::Timeout
            } else {
                error!(error = %e, "Failed to parse Google userinfo response");
                ProviderAuthError::Malformed(e.to_string())
            }
        })?;

        let claims = info.normalize()?;
        debug!(email = %safe_email_log(&claims.email), "Google userinfo resolved");
        Ok(claims)
    }
}
