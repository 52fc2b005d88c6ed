use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::api::{project_resource, ProjectResource};
use crate::app::AppState;
use crate::database::models::NewProject;
use crate::error::ApiError;
use crate::filter::{FilterOrder, ProjectIncludes};
use crate::handlers::utils::{find_project, page_request, FieldErrors};
use crate::middleware::{ApiResponse, ApiResult, PaginatedResponse};
use crate::policy::ownership;
use crate::types::Actor;

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub include: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub title: Option<String>,
}

/// GET /projects - Paginated projects, optionally `?include=tasks,members`
pub async fn project_list(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<PaginatedResponse<ProjectResource>, ApiError> {
    let includes = FilterOrder::parse_project_includes(query.include.as_deref())?;
    let request = page_request(query.page.as_deref(), query.per_page.as_deref())?;

    let page = state.store.list_projects(request).await?;
    let mut data = Vec::with_capacity(page.items.len());
    for project in &page.items {
        data.push(project_resource(state.store.as_ref(), project, includes).await?);
    }

    Ok(PaginatedResponse { data, meta: page.meta() })
}

/// GET /projects/:project - One project with its tasks and members
pub async fn project_show(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<ProjectResource> {
    let store = state.store.as_ref();
    let project = find_project(store, &project_id).await?;
    let includes = ProjectIncludes { tasks: true, members: true };
    Ok(ApiResponse::success(project_resource(store, &project, includes).await?))
}

/// POST /projects - Create a project owned by the caller
///
/// Expected Input:
/// ```json
/// { "title": "Website relaunch" }
/// ```
pub async fn project_create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> ApiResult<ProjectResource> {
    let Json(body) = payload?;
    let mut errors = FieldErrors::new();
    let title = errors.title("title", body.title.as_deref());
    errors.finish()?;

    let project = state
        .store
        .create_project(NewProject {
            title: title.unwrap_or_default(),
            creator_id: actor.id,
        })
        .await?;

    tracing::info!("User {} created project {}", actor.id, project.id);
    Ok(ApiResponse::created(ProjectResource::from(&project)))
}

/// PUT|PATCH /projects/:project - Rename a project (creator only)
pub async fn project_update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<String>,
    payload: Result<Json<ProjectRequest>, JsonRejection>,
) -> ApiResult<ProjectResource> {
    let store = state.store.as_ref();
    let project = find_project(store, &project_id).await?;
    ownership::ensure_project_creator(&actor, &project)?;

    let Json(body) = payload?;
    let mut errors = FieldErrors::new();
    let title = errors.title("title", body.title.as_deref());
    errors.finish()?;

    let project = store.update_project_title(project.id, &title.unwrap_or_default()).await?;
    Ok(ApiResponse::success(ProjectResource::from(&project)))
}

/// DELETE /projects/:project - Delete a project (creator only)
///
/// Refused with 409 while the project still has tasks.
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = state.store.as_ref();
    let project = find_project(store, &project_id).await?;
    ownership::ensure_project_creator(&actor, &project)?;

    store.delete_project(project.id).await?;
    tracing::info!("User {} deleted project {}", actor.id, project.id);
    Ok(StatusCode::NO_CONTENT)
}
