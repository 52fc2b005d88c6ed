use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::database::EntityStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

/// Build the full router: public routes, token-protected routes, global layers
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state);

    let router = match cors_layer() {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config::config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/register", post(auth::register_post))
        .route("/login", post(auth::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{auth, me, members, projects, tasks};

    Router::new()
        // Session
        .route("/logout", post(auth::logout_post))
        .route("/user", get(auth::user_get))
        .route("/me/tasks", get(me::created_tasks_get))
        .route("/me/tasks/assigned", get(me::assigned_tasks_get))
        // Projects
        .route("/projects", get(projects::project_list).post(projects::project_create))
        .route(
            "/projects/:project",
            get(projects::project_show)
                .put(projects::project_update)
                .patch(projects::project_update)
                .delete(projects::project_delete),
        )
        .route(
            "/projects/:project/members/:user",
            post(members::member_attach).delete(members::member_detach),
        )
        // Tasks
        .route("/tasks", get(tasks::task_list).post(tasks::task_create))
        .route(
            "/tasks/:task",
            get(tasks::task_show)
                .put(tasks::task_update)
                .patch(tasks::task_update)
                .delete(tasks::task_delete),
        )
        .route("/tasks/:task/assign/:user", patch(tasks::task_assign))
        .route("/tasks/:task/unassign", patch(tasks::task_unassign))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer() -> Option<CorsLayer> {
    let security = &config::config().security;
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "unavailable" })),
            )
        }
    }
}
