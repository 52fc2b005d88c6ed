// handlers/public/auth/login.rs - POST /login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::TokenResponse;
use crate::app::AppState;
use crate::auth::{generate_jwt, verify_password, AuthError, Claims};
use crate::error::ApiError;
use crate::handlers::utils::FieldErrors;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /login - Authenticate with email and password
///
/// Unknown email and wrong password get the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(body) = payload?;

    let mut errors = FieldErrors::new();
    let email = errors.required("email", body.email.as_deref());
    let password = body.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.finish()?;
    let email = email.unwrap_or_default().to_lowercase();

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        tracing::warn!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if let Err(e) = verify_password(&password, &user.password_hash) {
        tracing::warn!("Failed login for user {}", user.id);
        return Err(e.into());
    }

    let token = generate_jwt(&Claims::new(user.id)?)?;
    tracing::info!("User {} logged in", user.id);
    Ok(Json(TokenResponse {
        user: (&user).into(),
        token,
    }))
}
