//! Project-specific utilities live here.

use axum::{extract::rejection::JsonRejection, Json};
use bookstore_http::error::AppError;

/// Unwrap a JSON body, reporting malformed payloads in the standard error
/// format instead of axum's plain-text rejection.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()).with_code("invalid_body"))
}

/// Reject blank required fields, naming the first one missing.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((name, _)) => Err(AppError::bad_request(format!("{} is required", name))
            .with_code("missing_field")),
        None => Ok(()),
    }
}
