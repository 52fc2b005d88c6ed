// handlers/public/auth/mod.rs - Account creation and token acquisition

use serde::Serialize;

use crate::api::UserResource;

pub mod login;    // POST /login - exchange credentials for a JWT
pub mod register; // POST /register - create an account and sign in

pub use login::login_post;
pub use register::register_post;

/// `{user, token}` body returned by both endpoints
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: UserResource,
    pub token: String,
}
