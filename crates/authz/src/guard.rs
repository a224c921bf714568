use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::{
    error::AuthError,
    token::{Claims, TokenIssuer},
};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Guards routes that act on behalf of a named user.
#[derive(Debug, Clone)]
pub struct BearerGuard {
    issuer: Arc<TokenIssuer>,
    required: bool,
}

impl BearerGuard {
    pub fn new(issuer: Arc<TokenIssuer>, required: bool) -> Self {
        Self { issuer, required }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check that the caller holds a valid token issued to `username`.
    ///
    /// Returns `Ok(None)` without looking at the headers when enforcement
    /// is switched off.
    pub fn authorize(
        &self,
        headers: &HeaderMap,
        username: &str,
    ) -> Result<Option<Claims>, AuthError> {
        if !self.required {
            tracing::debug!(username, "bearer enforcement disabled, skipping token check");
            return Ok(None);
        }

        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = self.issuer.verify(token)?;

        if claims.sub != username {
            return Err(AuthError::SubjectMismatch {
                subject: claims.sub,
                username: username.to_string(),
            });
        }

        Ok(Some(claims))
    }
}
