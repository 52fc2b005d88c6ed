/// Shared types used across the codebase

use uuid::Uuid;

/// The authenticated identity performing a request.
///
/// Resolved once by the auth middleware and passed explicitly into every
/// policy call; nothing below the handlers looks up "the current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
}

impl Actor {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}
