use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{NewProject, NewTask, NewUser, Project, Task, TaskChanges, User};
use crate::filter::{Page, PageRequest, TaskQuery};

/// Errors from the entity store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Durable storage for users, projects, tasks and project membership.
///
/// Implementations must make `insert_membership` an insert-if-absent and
/// `delete_membership` a delete-if-present so concurrent requests for the same
/// pair stay idempotent. `update_task_assignee` with `Some(user)` must check
/// membership in the same step as the write.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    // Users
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn load_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    // Projects
    async fn create_project(&self, new: NewProject) -> Result<Project, StoreError>;
    async fn load_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn list_projects(&self, page: PageRequest) -> Result<Page<Project>, StoreError>;
    async fn update_project_title(&self, id: Uuid, title: &str) -> Result<Project, StoreError>;
    /// Fails with `Conflict` while the project still has tasks.
    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError>;
    async fn project_tasks(&self, id: Uuid) -> Result<Vec<Task>, StoreError>;

    // Membership
    /// Members in insertion order.
    async fn project_members(&self, project_id: Uuid) -> Result<Vec<User>, StoreError>;
    async fn insert_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;
    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    // Tasks
    async fn create_task(&self, new: NewTask) -> Result<Task, StoreError>;
    async fn load_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>, StoreError>;
    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;
    async fn tasks_assigned_to(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;
    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;

    /// Set or clear a task's assignee.
    ///
    /// Returns `Ok(None)` when `assignee` is not a member of the task's
    /// project at write time; nothing is written in that case. Clearing
    /// always succeeds. A missing task is `NotFound`.
    async fn update_task_assignee(
        &self,
        task_id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Option<Task>, StoreError>;
}
