use uuid::Uuid;

use crate::database::models::{NewProject, NewTask, NewUser, Project, Task, User};
use crate::database::{EntityStore, MemoryStore};
use crate::types::Actor;

/// Test utilities for seeding an in-memory store
pub struct TestContext {
    pub store: MemoryStore,
}

impl TestContext {
    pub fn new() -> Self {
        Self { store: MemoryStore::new() }
    }

    /// Create a user with a unique email
    pub async fn user(&self, name: &str) -> anyhow::Result<User> {
        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}_{}@example.com", name, Uuid::new_v4().simple()),
                password_hash: "unused".to_string(),
            })
            .await?;
        Ok(user)
    }

    pub async fn project(&self, creator: &User, title: &str) -> anyhow::Result<Project> {
        let project = self
            .store
            .create_project(NewProject { title: title.to_string(), creator_id: creator.id })
            .await?;
        Ok(project)
    }

    pub async fn task(&self, creator: &User, project: &Project, title: &str) -> anyhow::Result<Task> {
        let task = self
            .store
            .create_task(NewTask {
                title: title.to_string(),
                description: None,
                creator_id: creator.id,
                project_id: project.id,
            })
            .await?;
        Ok(task)
    }

    /// Current member ids of a project, in insertion order
    pub async fn member_ids(&self, project: &Project) -> anyhow::Result<Vec<Uuid>> {
        let members = self.store.project_members(project.id).await?;
        Ok(members.into_iter().map(|u| u.id).collect())
    }

    /// Fresh copy of a task's assignee
    pub async fn assignee_of(&self, task: &Task) -> anyhow::Result<Option<Uuid>> {
        let task = self
            .store
            .load_task(task.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("task {} vanished", task.id))?;
        Ok(task.assignee_id)
    }
}

pub fn actor(user: &User) -> Actor {
    Actor::new(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_distinct_users() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let a = ctx.user("alice").await?;
        let b = ctx.user("alice").await?;

        assert_ne!(a.id, b.id);
        assert_ne!(a.email, b.email);
        Ok(())
    }
}
