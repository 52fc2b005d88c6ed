//! Membership and assignment rules for projects and tasks.
//!
//! Handlers resolve ids to entities, then call into these policies with the
//! authenticated [`Actor`](crate::types::Actor). Every policy checks
//! authorization first and only then looks at membership, so a caller who is
//! not allowed to act learns nothing about the project's member set.

use thiserror::Error;

use crate::database::StoreError;

pub mod assignment;
pub mod membership;
pub mod ownership;

pub use assignment::AssignmentPolicy;
pub use membership::MembershipPolicy;

/// Outcome of a denied or failed policy operation
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The actor is not the creator of the project or task.
    #[error("This action is unauthorized.")]
    Unauthorized,

    /// The actor may assign, but the candidate is not a project member.
    #[error("You cannot assign this user to this task.")]
    InvalidAssignee,

    /// Passed through from the store untouched.
    #[error(transparent)]
    Store(#[from] StoreError),
}
