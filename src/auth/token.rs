//! JWT issuance and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use super::models::Claims;

/// Lifetime of an issued token
pub const TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, unsigned, signed with another secret or algorithm
    #[error("invalid token")]
    Invalid,

    /// Signature checks out but the expiry has passed
    #[error("token expired")]
    Expired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Signs and verifies HS256 bearer tokens with a server-held secret.
///
/// Tokens are stateless: nothing is recorded server side, so a token stays
/// valid until `exp` whatever the client does with it.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(TOKEN_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "JWT encoding error");
            TokenError::Signing(e.to_string())
        })
    }

    /// Returns the subject of a valid, unexpired token
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now()).map(|claims| claims.sub)
    }

    /// Verifies against an explicit clock.
    ///
    /// Expiry is checked here rather than by `jsonwebtoken` so that the
    /// check uses `now` and reports `Expired` separately from `Invalid`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let decoded = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "JWT token validation failed");
            TokenError::Invalid
        })?;

        if decoded.claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        if decoded.claims.exp <= now.timestamp() {
            debug!(exp = decoded.claims.exp, now = now.timestamp(), "JWT token expired");
            return Err(TokenError::Expired);
        }

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &str = "test_secret_key";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();

        let token = tokens.issue_at("U_ABCDEFGHJK", now).unwrap();
        let claims = tokens.verify_at(&token, now).unwrap();

        assert_eq!(claims.sub, "U_ABCDEFGHJK");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::days(30)).timestamp());
    }

    #[test]
    fn test_token_valid_until_thirty_day_horizon() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();
        let token = tokens.issue_at("user-1", now).unwrap();

        let just_before = now + Duration::days(30) - Duration::seconds(1);
        assert!(tokens.verify_at(&token, just_before).is_ok());

        let at_expiry = now + Duration::days(30);
        assert_eq!(tokens.verify_at(&token, at_expiry), Err(TokenError::Expired));

        let long_after = now + Duration::days(31);
        assert_eq!(tokens.verify_at(&token, long_after), Err(TokenError::Expired));
    }

    #[test]
    fn test_wall_clock_verify() {
        let tokens = TokenService::new(SECRET);
        let token = tokens.issue("user-2").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "user-2");
    }

    #[test]
    fn test_wrong_secret_is_invalid_not_expired() {
        let tokens = TokenService::new(SECRET);
        let other = TokenService::new("wrong_secret_key");
        let now = fixed_now();

        let token = other.issue_at("user-1", now).unwrap();
        assert_eq!(tokens.verify_at(&token, now), Err(TokenError::Invalid));

        // expired and badly signed reports Invalid
        let later = now + Duration::days(60);
        assert_eq!(tokens.verify_at(&token, later), Err(TokenError::Invalid));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();

        assert_eq!(tokens.verify_at("", now), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_at("not.a.jwt", now), Err(TokenError::Invalid));
        assert_eq!(tokens.verify_at("garbage", now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();
        let token = tokens.issue_at("user-1", now).unwrap();

        let other = tokens.issue_at("admin", now).unwrap();
        let forged_payload = other.split('.').nth(1).unwrap().to_string();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let tampered = parts.join(".");

        assert_eq!(tokens.verify_at(&tampered, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_other_algorithm_is_invalid() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(tokens.verify_at(&token, now), Err(TokenError::Invalid));
    }

    #[test]
    fn test_empty_subject_is_invalid() {
        let tokens = TokenService::new(SECRET);
        let now = fixed_now();
        let token = tokens.issue_at("", now).unwrap();
        assert_eq!(tokens.verify_at(&token, now), Err(TokenError::Invalid));
    }
}
