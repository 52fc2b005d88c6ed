use tracing::{info, warn};
use uuid::Uuid;

use super::{ownership, PolicyError};
use crate::database::models::{Project, User};
use crate::database::EntityStore;
use crate::types::Actor;

/// Gates changes to a project's member set.
///
/// Attach and detach are expressed as insert-if-absent and delete-if-present
/// in the store, so repeating either is a successful no-op.
pub struct MembershipPolicy<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> MembershipPolicy<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    pub fn can_attach_member(actor: &Actor, project: &Project) -> bool {
        ownership::is_project_creator(actor, project)
    }

    pub fn can_detach_member(actor: &Actor, project: &Project) -> bool {
        ownership::is_project_creator(actor, project)
    }

    pub async fn attach_member(
        &self,
        actor: &Actor,
        project: &Project,
        user: &User,
    ) -> Result<(), PolicyError> {
        if !Self::can_attach_member(actor, project) {
            warn!("Actor {} may not attach members to project {}", actor.id, project.id);
            return Err(PolicyError::Unauthorized);
        }

        self.store.insert_membership(project.id, user.id).await?;
        info!("User {} is a member of project {}", user.id, project.id);
        Ok(())
    }

    pub async fn detach_member(
        &self,
        actor: &Actor,
        project: &Project,
        user: &User,
    ) -> Result<(), PolicyError> {
        if !Self::can_detach_member(actor, project) {
            warn!("Actor {} may not detach members from project {}", actor.id, project.id);
            return Err(PolicyError::Unauthorized);
        }

        self.store.delete_membership(project.id, user.id).await?;
        info!("User {} is not a member of project {}", user.id, project.id);
        Ok(())
    }

    pub async fn is_member(&self, project: &Project, user: &User) -> Result<bool, PolicyError> {
        self.is_member_of(project.id, user.id).await
    }

    pub(crate) async fn is_member_of(&self, project_id: Uuid, user_id: Uuid) -> Result<bool, PolicyError> {
        let members = self.store.project_members(project_id).await?;
        Ok(ownership::contains_member(&members, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use crate::testing::{actor, TestContext};

    #[tokio::test]
    async fn creator_attaches_member() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let member = ctx.user("member").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        policy.attach_member(&actor(&creator), &project, &member).await?;

        assert!(policy.is_member(&project, &member).await?);
        assert_eq!(ctx.member_ids(&project).await?, vec![member.id]);
        Ok(())
    }

    #[tokio::test]
    async fn attaching_twice_keeps_one_membership() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let member = ctx.user("member").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        policy.attach_member(&actor(&creator), &project, &member).await?;
        policy.attach_member(&actor(&creator), &project, &member).await?;

        assert_eq!(ctx.member_ids(&project).await?, vec![member.id]);
        Ok(())
    }

    #[tokio::test]
    async fn detaching_a_non_member_succeeds() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let stranger = ctx.user("stranger").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        policy.detach_member(&actor(&creator), &project, &stranger).await?;

        assert!(ctx.member_ids(&project).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn detach_removes_only_that_member() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let first = ctx.user("first").await?;
        let second = ctx.user("second").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        policy.attach_member(&actor(&creator), &project, &first).await?;
        policy.attach_member(&actor(&creator), &project, &second).await?;
        policy.detach_member(&actor(&creator), &project, &first).await?;

        assert_eq!(ctx.member_ids(&project).await?, vec![second.id]);
        Ok(())
    }

    #[tokio::test]
    async fn non_creator_cannot_change_members() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let intruder = ctx.user("intruder").await?;
        let member = ctx.user("member").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        let attach = policy.attach_member(&actor(&intruder), &project, &member).await;
        assert!(matches!(attach, Err(PolicyError::Unauthorized)));
        assert!(ctx.member_ids(&project).await?.is_empty());

        policy.attach_member(&actor(&creator), &project, &member).await?;
        let detach = policy.detach_member(&actor(&intruder), &project, &member).await;
        assert!(matches!(detach, Err(PolicyError::Unauthorized)));
        assert_eq!(ctx.member_ids(&project).await?, vec![member.id]);
        Ok(())
    }

    #[tokio::test]
    async fn members_cannot_manage_membership_either() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let member = ctx.user("member").await?;
        let newcomer = ctx.user("newcomer").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        policy.attach_member(&actor(&creator), &project, &member).await?;
        let result = policy.attach_member(&actor(&member), &project, &newcomer).await;

        assert!(matches!(result, Err(PolicyError::Unauthorized)));
        assert_eq!(ctx.member_ids(&project).await?, vec![member.id]);
        Ok(())
    }

    #[tokio::test]
    async fn creator_is_not_a_member_until_attached() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let policy = MembershipPolicy::new(&ctx.store);

        assert!(!policy.is_member(&project, &creator).await?);
        policy.attach_member(&actor(&creator), &project, &creator).await?;
        assert!(policy.is_member(&project, &creator).await?);
        Ok(())
    }

    #[tokio::test]
    async fn store_failures_pass_through() -> anyhow::Result<()> {
        let ctx = TestContext::new();
        let creator = ctx.user("creator").await?;
        let project = ctx.project(&creator, "Launch").await?;
        let mut ghost = ctx.user("ghost").await?;
        ghost.id = Uuid::new_v4();
        let policy = MembershipPolicy::new(&ctx.store);

        let result = policy.attach_member(&actor(&creator), &project, &ghost).await;

        assert!(matches!(result, Err(PolicyError::Store(StoreError::NotFound(_)))));
        Ok(())
    }
}
