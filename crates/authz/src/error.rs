use bookstore_http::error::AppError;
use thiserror::Error;

/// Failures while issuing or checking bearer tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("token lifetime of {0}s is out of range")]
    InvalidTtl(u64),

    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("token subject '{subject}' does not match '{username}'")]
    SubjectMismatch { subject: String, username: String },

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => {
                AppError::unauthorized("Authorization header with a bearer token is required")
                    .with_code("missing_token")
            }
            AuthError::InvalidToken(_) => {
                AppError::unauthorized("Token is not valid").with_code("invalid_token")
            }
            AuthError::Expired => AppError::unauthorized("Token has expired").with_code("token_expired"),
            AuthError::SubjectMismatch { .. } => {
                AppError::forbidden("Token does not belong to this user").with_code("subject_mismatch")
            }
            other @ (AuthError::EmptySecret | AuthError::InvalidTtl(_) | AuthError::Signing(_)) => {
                AppError::Internal(anyhow::Error::new(other))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn token_failures_map_to_401() {
        assert_eq!(AppError::from(AuthError::MissingToken).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(AuthError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(AuthError::InvalidToken("bad".into())).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn subject_mismatch_maps_to_403() {
        let err = AuthError::SubjectMismatch {
            subject: "alice".into(),
            username: "bob".into(),
        };
        assert_eq!(AppError::from(err).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn configuration_failures_are_internal() {
        assert_eq!(
            AppError::from(AuthError::EmptySecret).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
