use axum::{extract::State, Extension};

use crate::api::{task_resources, TaskResource};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Actor;

/// GET /me/tasks - Tasks the caller created
pub async fn created_tasks_get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<TaskResource>> {
    let tasks = state.store.tasks_created_by(actor.id).await?;
    Ok(ApiResponse::success(task_resources(state.store.as_ref(), &tasks).await?))
}

/// GET /me/tasks/assigned - Tasks assigned to the caller
pub async fn assigned_tasks_get(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<TaskResource>> {
    let tasks = state.store.tasks_assigned_to(actor.id).await?;
    Ok(ApiResponse::success(task_resources(state.store.as_ref(), &tasks).await?))
}
