//! Signed login tokens.
//!
//! Tokens are HS256 JWTs carrying the username as `sub` plus `iat`/`exp`
//! timestamps. Nothing is stored server-side; a token is valid while its
//! signature checks out under the process secret and `exp` lies ahead.

use std::fmt;

use bookstore_kernel::settings::AuthSettings;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::AuthError;

/// Claims embedded in every issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Issue time, Unix seconds
    pub iat: i64,
    /// Expiry time, Unix seconds
    pub exp: i64,
}

/// Issues and verifies tokens under a single shared secret
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        let ttl = i64::try_from(ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::seconds)
            .filter(|ttl| OffsetDateTime::now_utc().checked_add(*ttl).is_some())
            .ok_or(AuthError::InvalidTtl(ttl_secs))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            ttl_secs,
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        Self::new(&settings.jwt_secret, settings.token_ttl_secs)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a token for `username` expiring one TTL from now.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        self.issue_at(username, OffsetDateTime::now_utc())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(&self, username: &str, issued_at: OffsetDateTime) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add(self.ttl)
            .ok_or(AuthError::InvalidTtl(self.ttl_secs))?;
        let claims = Claims {
            sub: username.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(err.to_string()),
            })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
