use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{NewProject, NewTask, NewUser, Project, Task, TaskChanges, User};
use crate::database::store::{EntityStore, StoreError};
use crate::filter::{FilterOrderInfo, Page, PageRequest, SortDirection, TaskQuery, TaskSortColumn};

/// Rows kept in insertion order so listings are stable on timestamp ties
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    memberships: Vec<(Uuid, Uuid)>,
}

impl Tables {
    fn is_member(&self, project_id: Uuid, user_id: Uuid) -> bool {
        self.memberships.contains(&(project_id, user_id))
    }

    fn task_mut(&mut self, id: Uuid) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("task {}", id)))
    }
}

/// In-process entity store. Every operation holds the table lock for its
/// whole duration, so check-and-write sequences are atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare_tasks(a: &Task, b: &Task, order: &[FilterOrderInfo]) -> Ordering {
    for info in order {
        let ord = match info.column {
            TaskSortColumn::Title => a.title.cmp(&b.title),
            TaskSortColumn::IsDone => a.is_done.cmp(&b.is_done),
            TaskSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        let ord = match info.sort {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tasks
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            return Err(StoreError::Conflict("user already exists".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn load_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn create_project(&self, new: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == new.creator_id) {
            return Err(StoreError::NotFound("project references a missing record".to_string()));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            title: new.title,
            creator_id: new.creator_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn load_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, page: PageRequest) -> Result<Page<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(Page::from_vec(tables.projects.clone(), page))
    }

    async fn update_project_title(&self, id: Uuid, title: &str) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("project {}", id)))?;
        project.title = title.to_string();
        project.updated_at = Utc::now();
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound(format!("project {}", id)));
        }
        if tables.tasks.iter().any(|t| t.project_id == id) {
            return Err(StoreError::Conflict("project still has tasks".to_string()));
        }
        tables.projects.retain(|p| p.id != id);
        tables.memberships.retain(|(project_id, _)| *project_id != id);
        Ok(())
    }

    async fn project_tasks(&self, id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let tasks = tables.tasks.iter().filter(|t| t.project_id == id).cloned().collect();
        Ok(newest_first(tasks))
    }

    async fn project_members(&self, project_id: Uuid) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        let members = tables
            .memberships
            .iter()
            .filter(|(p, _)| *p == project_id)
            .filter_map(|(_, user_id)| tables.users.iter().find(|u| u.id == *user_id).cloned())
            .collect();
        Ok(members)
    }

    async fn insert_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let project_exists = tables.projects.iter().any(|p| p.id == project_id);
        let user_exists = tables.users.iter().any(|u| u.id == user_id);
        if !project_exists || !user_exists {
            return Err(StoreError::NotFound("membership references a missing record".to_string()));
        }
        if !tables.is_member(project_id, user_id) {
            tables.memberships.push((project_id, user_id));
        }
        Ok(())
    }

    async fn delete_membership(&self, project_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.memberships.retain(|pair| *pair != (project_id, user_id));
        Ok(())
    }

    async fn create_task(&self, new: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let project_exists = tables.projects.iter().any(|p| p.id == new.project_id);
        let creator_exists = tables.users.iter().any(|u| u.id == new.creator_id);
        if !project_exists || !creator_exists {
            return Err(StoreError::NotFound("task references a missing record".to_string()));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            is_done: false,
            creator_id: new.creator_id,
            project_id: new.project_id,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn load_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Page<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| query.is_done.map_or(true, |done| t.is_done == done))
            .cloned()
            .collect();
        // Stable sort keeps insertion order on ties
        tasks.sort_by(|a, b| compare_tasks(a, b, &query.order));
        Ok(Page::from_vec(tasks, query.page))
    }

    async fn tasks_created_by(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let tasks = tables.tasks.iter().filter(|t| t.creator_id == user_id).cloned().collect();
        Ok(newest_first(tasks))
    }

    async fn tasks_assigned_to(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let tasks = tables
            .tasks
            .iter()
            .filter(|t| t.assignee_id == Some(user_id))
            .cloned()
            .collect();
        Ok(newest_first(tasks))
    }

    async fn update_task(&self, id: Uuid, changes: &TaskChanges) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        let task = tables.task_mut(id)?;
        changes.apply(task);
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);
        if tables.tasks.len() == before {
            return Err(StoreError::NotFound(format!("task {}", id)));
        }
        Ok(())
    }

    async fn update_task_assignee(
        &self,
        task_id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        let project_id = tables.task_mut(task_id)?.project_id;

        if let Some(user_id) = assignee {
            if !tables.is_member(project_id, user_id) {
                return Ok(None);
            }
        }

        let task = tables.task_mut(task_id)?;
        task.assignee_id = assignee;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &MemoryStore, email: &str) -> User {
        store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn membership_insert_is_idempotent() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.com").await;
        let member = seed_user(&store, "member@example.com").await;
        let project = store
            .create_project(NewProject { title: "P".to_string(), creator_id: owner.id })
            .await
            .unwrap();

        store.insert_membership(project.id, member.id).await.unwrap();
        store.insert_membership(project.id, member.id).await.unwrap();
        assert_eq!(store.project_members(project.id).await.unwrap().len(), 1);

        store.delete_membership(project.id, member.id).await.unwrap();
        store.delete_membership(project.id, member.id).await.unwrap();
        assert!(store.project_members(project.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn guarded_assignee_write_rejects_non_members() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.com").await;
        let outsider = seed_user(&store, "outsider@example.com").await;
        let project = store
            .create_project(NewProject { title: "P".to_string(), creator_id: owner.id })
            .await
            .unwrap();
        let task = store
            .create_task(NewTask {
                title: "T".to_string(),
                description: None,
                creator_id: owner.id,
                project_id: project.id,
            })
            .await
            .unwrap();

        assert!(store.update_task_assignee(task.id, Some(outsider.id)).await.unwrap().is_none());
        assert!(store.load_task(task.id).await.unwrap().unwrap().assignee_id.is_none());

        let missing = store.update_task_assignee(Uuid::new_v4(), None).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn project_with_tasks_cannot_be_deleted() {
        let store = MemoryStore::new();
        let owner = seed_user(&store, "owner@example.com").await;
        let project = store
            .create_project(NewProject { title: "P".to_string(), creator_id: owner.id })
            .await
            .unwrap();
        let task = store
            .create_task(NewTask {
                title: "T".to_string(),
                description: None,
                creator_id: owner.id,
                project_id: project.id,
            })
            .await
            .unwrap();

        assert!(matches!(store.delete_project(project.id).await, Err(StoreError::Conflict(_))));
        store.delete_task(task.id).await.unwrap();
        store.delete_project(project.id).await.unwrap();
        assert!(store.load_project(project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        seed_user(&store, "a@example.com").await;
        let dup = store
            .create_user(NewUser {
                name: "A".to_string(),
                email: "A@Example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }
}
