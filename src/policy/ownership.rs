//! Creator and membership lookups shared by both policies.

use tracing::warn;
use uuid::Uuid;

use super::PolicyError;
use crate::database::models::{Project, Task, User};
use crate::types::Actor;

pub fn is_project_creator(actor: &Actor, project: &Project) -> bool {
    actor.id == project.creator_id
}

pub fn is_task_creator(actor: &Actor, task: &Task) -> bool {
    actor.id == task.creator_id
}

/// Only the explicit member set counts; a creator is not implied.
pub fn contains_member(members: &[User], user_id: Uuid) -> bool {
    members.iter().any(|member| member.id == user_id)
}

pub fn ensure_project_creator(actor: &Actor, project: &Project) -> Result<(), PolicyError> {
    if is_project_creator(actor, project) {
        return Ok(());
    }
    warn!("Actor {} denied on project {} (creator {})", actor.id, project.id, project.creator_id);
    Err(PolicyError::Unauthorized)
}

pub fn ensure_task_creator(actor: &Actor, task: &Task) -> Result<(), PolicyError> {
    if is_task_creator(actor, task) {
        return Ok(());
    }
    warn!("Actor {} denied on task {} (creator {})", actor.id, task.id, task.creator_id);
    Err(PolicyError::Unauthorized)
}
