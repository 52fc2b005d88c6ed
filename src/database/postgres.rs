use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewProject, NewTask, NewUser, Project, Task, TaskChanges, User};
use crate::database::store::{EntityStore, StoreError};
use crate::filter::{FilterOrder, Page, PageRequest, TaskQuery};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";
const PROJECT_COLUMNS: &str = "id, title, creator_id, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, is_done, creator_id, project_id, assignee_id, created_at, updated_at";

/// Postgres-backed entity store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn task_exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn tasks_where(&self, column: &str, value: Uuid) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE {} = $1 ORDER BY created_at DESC, id",
            TASK_COLUMNS, column
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }
}

/// Map constraint violations onto the store's own vocabulary
fn constraint_error(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::NotFound(format!("{} references a missing record", what));
        }
    }
    StoreError::Sqlx(err)
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "user"))
    }

    async fn load_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_project(&self, new: NewProject) -> Result<Project, StoreError> {
        let sql = format!(
            "INSERT INTO projects (id, title, creator_id) VALUES ($1, $2, $3) RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(new.creator_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "project"))
    }

    async fn load_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let sql = format!("SELECT {} FROM projects WHERE id = $1", PROJECT_COLUMNS);
        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn list_projects(&self, page: PageRequest) -> Result<Page<Project>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM projects ORDER BY created_at, id LIMIT $1 OFFSET $2",
            PROJECT_COLUMNS
        );
        let items = sqlx::query_as::<_, Project>(&sql)
            .bind(to_i64(page.limit()))
            .bind(to_i64(page.offset()))
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total: total.max(0) as u64, request: page })
    }

    async fn update_project_title(&self, id: Uuid, title: &str) -> Result<Project, StoreError> {
        let sql = format!(
            "UPDATE projects SET title = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PROJECT_COLUMNS
        );
        sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("project {}", id)))
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        // Membership rows cascade; tasks restrict.
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match constraint_error(e, "project") {
                StoreError::NotFound(_) => {
                    StoreError::Conflict("project still has tasks".to_string())
                }
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("project {}", id)));
        }
        Ok(())
    }

    async fn project_tasks(&self, id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.tasks_where("project_id", id).await
    }

    async fn project_members(&self, project_id: Uuid) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            "SELECT {} FROM users u JOIN project_members pm ON pm.user_id = u.id \
             WHERE pm.project_id = $1 ORDER BY pm.created_at, u.id",
            USER_COLUMNS
                .split(", ")
                .map(|c| format!("u.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let members = sqlx::query_as::<_, User>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn insert_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "membership"))?;
        Ok(())
    }

    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, creator_id, project_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.creator_id)
            .bind(new.project_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "task"))
    }

    async fn load_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>, StoreError> {
        const WHERE: &str = "WHERE ($1::boolean IS NULL OR is_done = $1)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tasks {}", WHERE))
            .bind(query.is_done)
            .fetch_one(&self.pool)
            .await?;

        // Columns come from a whitelist, never from the request verbatim
        let order = FilterOrder::generate(&query.order);
        let order = if order.is_empty() { "ORDER BY id".to_string() } else { format!("{}, id", order) };
        let sql = format!(
            "SELECT {} FROM tasks {} {} LIMIT $2 OFFSET $3",
            TASK_COLUMNS, WHERE, order
        );
        let items = sqlx::query_as::<_, Task>(&sql)
            .bind(query.is_done)
            .bind(to_i64(query.page.limit()))
            .bind(to_i64(query.page.offset()))
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total: total.max(0) as u64, request: query.page })
    }

    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.tasks_where("creator_id", user_id).await
    }

    async fn tasks_assigned_to(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.tasks_where("assignee_id", user_id).await
    }

    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError> {
        let sql = format!(
            "UPDATE tasks SET \
                title = COALESCE($2, title), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                is_done = COALESCE($5, is_done), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(&changes.title)
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(changes.is_done)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("task {}", id)));
        }
        Ok(())
    }

    async fn update_task_assignee(
        &self,
        task_id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Option<Task>, StoreError> {
        let Some(user_id) = assignee else {
            let sql = format!(
                "UPDATE tasks SET assignee_id = NULL, updated_at = now() WHERE id = $1 RETURNING {}",
                TASK_COLUMNS
            );
            return sqlx::query_as::<_, Task>(&sql)
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await?
                .map(Some)
                .ok_or_else(|| StoreError::NotFound(format!("task {}", task_id)));
        };

        // Membership is re-checked by the same statement that writes
        let sql = format!(
            "UPDATE tasks SET assignee_id = $2, updated_at = now() \
             WHERE id = $1 AND EXISTS ( \
                 SELECT 1 FROM project_members pm \
                 WHERE pm.project_id = tasks.project_id AND pm.user_id = $2 \
             ) RETURNING {}",
            TASK_COLUMNS
        );
        let updated = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if updated.is_some() || self.task_exists(task_id).await? {
            return Ok(updated);
        }
        Err(StoreError::NotFound(format!("task {}", task_id)))
    }
}
