use axum::{
    extract::{Path, State},
    Extension,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::utils::{find_project, find_user};
use crate::middleware::MessageResponse;
use crate::policy::MembershipPolicy;
use crate::types::Actor;

/// POST /projects/:project/members/:user - Attach a member (project creator only)
///
/// Attaching an existing member changes nothing and still succeeds.
pub async fn member_attach(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> Result<MessageResponse, ApiError> {
    let store = state.store.as_ref();
    let project = find_project(store, &project_id).await?;
    let user = find_user(store, &user_id).await?;

    MembershipPolicy::new(store).attach_member(&actor, &project, &user).await?;
    Ok(MessageResponse("Member attached successfully."))
}

/// DELETE /projects/:project/members/:user - Detach a member (project creator only)
///
/// Tasks already assigned to the user keep their assignee.
pub async fn member_detach(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> Result<MessageResponse, ApiError> {
    let store = state.store.as_ref();
    let project = find_project(store, &project_id).await?;
    let user = find_user(store, &user_id).await?;

    MembershipPolicy::new(store).detach_member(&actor, &project, &user).await?;
    Ok(MessageResponse("Member detached successfully."))
}
