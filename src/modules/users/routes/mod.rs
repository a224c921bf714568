use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use bookstore_authz::TokenIssuer;
use bookstore_http::error::AppError;

use super::{
    models::{Credentials, LoginResponse},
    store::UserStore,
};
use crate::utils::{json_body, require_fields};

/// Shared state for the users routes
#[derive(Debug, Clone)]
pub struct UsersState {
    pub store: Arc<UserStore>,
    pub issuer: Arc<TokenIssuer>,
}

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

async fn register(
    State(state): State<UsersState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<&'static str, AppError> {
    let credentials = json_body(payload)?;
    require_fields(&[
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ])?;

    state
        .store
        .register(&credentials.username, &credentials.password)?;

    tracing::info!(username = %credentials.username, users = state.store.len(), "user registered");
    Ok("User registered successfully")
}

async fn login(
    State(state): State<UsersState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let credentials = json_body(payload)?;

    if !state
        .store
        .authenticate(&credentials.username, &credentials.password)
    {
        return Err(AppError::unauthorized("Invalid credentials").with_code("invalid_credentials"));
    }

    let token = state.issuer.issue(&credentials.username)?;
    tracing::info!(username = %credentials.username, "token issued");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}
