// handlers/public/auth/register.rs - POST /register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::TokenResponse;
use crate::app::AppState;
use crate::auth::{generate_jwt, hash_password, Claims};
use crate::config;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::handlers::utils::FieldErrors;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /register - Create a user account and return a token for it
///
/// Expected Input:
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "at least 8 chars" }
/// ```
///
/// Responds 201 with `{ "user": {id, name, email}, "token": "..." }`.
/// A taken email is 409; field problems are 422 with `field_errors`.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(body) = payload?;

    let mut errors = FieldErrors::new();
    let name = errors.required("name", body.name.as_deref());
    let email = errors.email("email", body.email.as_deref());
    let password = body.password.unwrap_or_default();
    let min_length = config::config().security.min_password_length;
    if password.chars().count() < min_length {
        errors.add("password", format!("The password must be at least {} characters.", min_length));
    }
    errors.finish()?;
    let (name, email) = (name.unwrap_or_default(), email.unwrap_or_default());

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("The email has already been taken."));
    }

    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash: hash_password(&password),
        })
        .await?;
    let token = generate_jwt(&Claims::new(user.id)?)?;

    tracing::info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            user: (&user).into(),
            token,
        }),
    ))
}
