use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::api::{task_resource, task_resources, TaskResource};
use crate::app::AppState;
use crate::database::models::{NewTask, TaskChanges};
use crate::error::ApiError;
use crate::filter::{FilterOrder, TaskQuery};
use crate::handlers::utils::{find_task, find_user, page_request, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, PaginatedResponse};
use crate::policy::{ownership, AssignmentPolicy};
use crate::types::Actor;

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    #[serde(rename = "filter[is_done]")]
    pub is_done: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    // Absent keeps the description, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub is_done: Option<bool>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// GET /tasks - Paginated tasks
///
/// `filter[is_done]=true|false|1|0`, `sort=title,-created_at` over
/// `title`, `is_done` and `created_at`. Default order is newest first.
pub async fn task_list(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> Result<PaginatedResponse<TaskResource>, ApiError> {
    let task_query = TaskQuery {
        is_done: FilterOrder::parse_is_done(query.is_done.as_deref())?,
        order: FilterOrder::parse_task_sort(query.sort.as_deref())?,
        page: page_request(query.page.as_deref(), query.per_page.as_deref())?,
    };

    let page = state.store.list_tasks(&task_query).await?;
    let data = task_resources(state.store.as_ref(), &page.items).await?;
    Ok(PaginatedResponse { data, meta: page.meta() })
}

/// POST /tasks - Create a task in an existing project
///
/// Expected Input:
/// ```json
/// { "title": "Write copy", "description": "optional", "project_id": "uuid" }
/// ```
pub async fn task_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<TaskResource> {
    let Json(body) = payload?;
    let store = state.store.as_ref();

    let mut errors = FieldErrors::new();
    let title = errors.title("title", body.title.as_deref());
    let project_id = match errors.required("project_id", body.project_id.as_deref()) {
        Some(raw) => {
            let found = match Uuid::parse_str(&raw) {
                Ok(id) => store.load_project(id).await?.map(|project| project.id),
                Err(_) => None,
            };
            if found.is_none() {
                errors.add("project_id", "The selected project id is invalid.");
            }
            found
        }
        None => None,
    };
    errors.finish()?;
    let (Some(title), Some(project_id)) = (title, project_id) else {
        return Err(ApiError::bad_request("Invalid task payload"));
    };

    let task = store
        .create_task(NewTask {
            title,
            description: body.description.filter(|d| !d.trim().is_empty()),
            creator_id: actor.id,
            project_id,
        })
        .await?;

    tracing::info!("User {} created task {} in project {}", actor.id, task.id, project_id);
    Ok(ApiResponse::created(task_resource(store, &task).await?))
}

/// GET /tasks/:task
pub async fn task_show(State(state): State<AppState>, Path(task_id): Path<String>) -> ApiResult<TaskResource> {
    let store = state.store.as_ref();
    let task = find_task(store, &task_id).await?;
    Ok(ApiResponse::success(task_resource(store, &task).await?))
}

/// PUT|PATCH /tasks/:task - Edit title, description or done flag (creator only)
///
/// The project and the assignee cannot be changed here.
pub async fn task_update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<TaskResource> {
    let store = state.store.as_ref();
    let task = find_task(store, &task_id).await?;
    ownership::ensure_task_creator(&actor, &task)?;

    let Json(body) = payload?;
    let mut errors = FieldErrors::new();
    let title = match body.title.as_deref() {
        Some(raw) => errors.title("title", Some(raw)),
        None => None,
    };
    errors.finish()?;

    let changes = TaskChanges {
        title,
        description: body.description,
        is_done: body.is_done,
    };
    let task = store.update_task(task.id, &changes).await?;
    Ok(ApiResponse::success(task_resource(store, &task).await?))
}

/// DELETE /tasks/:task - Delete a task (creator only)
pub async fn task_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.as_ref();
    let task = find_task(store, &task_id).await?;
    ownership::ensure_task_creator(&actor, &task)?;

    store.delete_task(task.id).await?;
    tracing::info!("User {} deleted task {}", actor.id, task.id);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /tasks/:task/assign/:user - Assign a project member (task creator only)
///
/// 403 for anyone but the task creator, 422 `INVALID_ASSIGNEE` when the user
/// is not a member of the task's project.
pub async fn task_assign(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((task_id, user_id)): Path<(String, String)>,
) -> ApiResult<TaskResource> {
    let store = state.store.as_ref();
    let task = find_task(store, &task_id).await?;
    let user = find_user(store, &user_id).await?;

    let task = AssignmentPolicy::new(store).assign(&actor, &task, &user).await?;
    Ok(ApiResponse::success(task_resource(store, &task).await?))
}

/// PATCH /tasks/:task/unassign - Clear the assignee (task creator only)
pub async fn task_unassign(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(task_id): Path<String>,
) -> ApiResult<TaskResource> {
    let store = state.store.as_ref();
    let task = find_task(store, &task_id).await?;

    let task = AssignmentPolicy::new(store).unassign(&actor, &task).await?;
    Ok(ApiResponse::success(task_resource(store, &task).await?))
}
