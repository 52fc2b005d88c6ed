use tracing::{info, warn};

use super::membership::MembershipPolicy;
use super::{ownership, PolicyError};
use crate::database::models::{Task, User};
use crate::database::{EntityStore, StoreError};
use crate::types::Actor;

/// Gates changes to a task's assignee.
///
/// A task is either unassigned or assigned to one member of its project.
/// `assign` moves it to a member from any state; `unassign` always clears it.
pub struct AssignmentPolicy<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> AssignmentPolicy<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    pub fn can_assign(actor: &Actor, task: &Task) -> bool {
        ownership::is_task_creator(actor, task)
    }

    pub fn can_unassign(actor: &Actor, task: &Task) -> bool {
        ownership::is_task_creator(actor, task)
    }

    /// Assign `candidate` to `task`, replacing any previous assignee.
    pub async fn assign(&self, actor: &Actor, task: &Task, candidate: &User) -> Result<Task, PolicyError> {
        // Authorization strictly before the membership lookup
        if !Self::can_assign(actor, task) {
            warn!("Actor {} may not assign task {}", actor.id, task.id);
            return Err(PolicyError::Unauthorized);
        }

        let membership = MembershipPolicy::new(self.store);
        if !membership.is_member_of(task.project_id, candidate.id).await? {
            warn!(
                "User {} is not a member of project {}; not assigning task {}",
                candidate.id, task.project_id, task.id
            );
            return Err(PolicyError::InvalidAssignee);
        }

        // The store re-checks membership as part of the write
        match self.store.update_task_assignee(task.id, Some(candidate.id)).await? {
            Some(updated) => {
                info!("Task {} assigned to user {}", task.id, candidate.id);
                Ok(updated)
            }
            None => {
                warn!("User {} left project {} before task {} was assigned", candidate.id, task.project_id, task.id);
                Err(PolicyError::InvalidAssignee)
            }
        }
    }

    /// Clear the assignee. Clearing an unassigned task is a no-op success.
    pub async fn unassign(&self, actor: &Actor, task: &Task) -> Result<Task, PolicyError> {
        if !Self::can_unassign(actor, task) {
            warn!("Actor {} may not unassign task {}", actor.id, task.id);
            return Err(PolicyError::Unauthorized);
        }

        let updated = self
            .store
            .update_task_assignee(task.id, None)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("task {}", task.id)))?;
        info!("Task {} unassigned", task.id);
        Ok(updated)
    }
}
