use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Project, Task, User};
use crate::database::{EntityStore, StoreError};
use crate::filter::ProjectIncludes;

/// Public view of a user. Never carries the password digest.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserResource {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Wire format for a task
/// { id, title, description, project_title, assigned_to, status, creation-date }
#[derive(Debug, Clone, Serialize)]
pub struct TaskResource {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub project_title: String,
    pub assigned_to: Option<UserResource>,
    pub status: &'static str,
    #[serde(rename = "creation-date")]
    pub creation_date: String,
}

impl TaskResource {
    pub fn build(task: &Task, project: &Project, assignee: Option<&User>) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            project_title: project.title.clone(),
            assigned_to: assignee.map(UserResource::from),
            status: if task.is_done { "finished" } else { "open" },
            creation_date: task.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectResource {
    pub id: Uuid,
    pub title: String,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<UserResource>>,
}

impl From<&Project> for ProjectResource {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            title: project.title.clone(),
            creator_id: project.creator_id,
            created_at: project.created_at,
            tasks: None,
            members: None,
        }
    }
}

/// Loads the projects and assignees a batch of tasks refers to, once each.
struct RelationCache<'a> {
    store: &'a dyn EntityStore,
    projects: HashMap<Uuid, Project>,
    users: HashMap<Uuid, Option<User>>,
}

impl<'a> RelationCache<'a> {
    fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            projects: HashMap::new(),
            users: HashMap::new(),
        }
    }

    fn seed_project(&mut self, project: &Project) {
        self.projects.insert(project.id, project.clone());
    }

    async fn resolve(&mut self, task: &Task) -> Result<TaskResource, StoreError> {
        if !self.projects.contains_key(&task.project_id) {
            let project = self
                .store
                .load_project(task.project_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("project {}", task.project_id)))?;
            self.projects.insert(project.id, project);
        }

        if let Some(assignee_id) = task.assignee_id {
            if !self.users.contains_key(&assignee_id) {
                let user = self.store.load_user(assignee_id).await?;
                self.users.insert(assignee_id, user);
            }
        }

        let project = &self.projects[&task.project_id];
        let assignee = task
            .assignee_id
            .and_then(|id| self.users.get(&id))
            .and_then(Option::as_ref);
        Ok(TaskResource::build(task, project, assignee))
    }
}

pub async fn task_resource(store: &dyn EntityStore, task: &Task) -> Result<TaskResource, StoreError> {
    RelationCache::new(store).resolve(task).await
}

pub async fn task_resources(store: &dyn EntityStore, tasks: &[Task]) -> Result<Vec<TaskResource>, StoreError> {
    let mut cache = RelationCache::new(store);
    let mut resources = Vec::with_capacity(tasks.len());
    for task in tasks {
        resources.push(cache.resolve(task).await?);
    }
    Ok(resources)
}

/// Build a project resource, embedding the requested relations.
pub async fn project_resource(
    store: &dyn EntityStore,
    project: &Project,
    includes: ProjectIncludes,
) -> Result<ProjectResource, StoreError> {
    let mut resource = ProjectResource::from(project);

    if includes.tasks {
        let tasks = store.project_tasks(project.id).await?;
        let mut cache = RelationCache::new(store);
        cache.seed_project(project);
        let mut embedded = Vec::with_capacity(tasks.len());
        for task in &tasks {
            embedded.push(cache.resolve(task).await?);
        }
        resource.tasks = Some(embedded);
    }

    if includes.members {
        let members = store.project_members(project.id).await?;
        resource.members = Some(members.iter().map(UserResource::from).collect());
    }

    Ok(resource)
}
