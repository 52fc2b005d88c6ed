use axum::Extension;

use crate::api::UserResource;
use crate::database::models::User;
use crate::middleware::{ApiResponse, MessageResponse};

/// GET /user - The authenticated user
pub async fn user_get(Extension(user): Extension<User>) -> ApiResponse<UserResource> {
    ApiResponse::success(UserResource::from(&user))
}

/// POST /logout - Acknowledge logout
///
/// Tokens are stateless; the client drops its copy and it lapses at `exp`.
pub async fn logout_post(Extension(user): Extension<User>) -> MessageResponse {
    tracing::info!("User {} logged out", user.id);
    MessageResponse("Successfully logged out.")
}
