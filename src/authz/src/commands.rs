//! Role and membership commands with cache invalidation
//!
//! Every command writes through an [`AggregateWriter`] and, once the write has
//! succeeded, invalidates the resolver entry it affected. Code that mutates
//! roles or memberships should go through this handler rather than the
//! writer directly, otherwise the resolver keeps serving the old snapshot.

use crate::error::Result;
use crate::resolver::AuthorizationResolver;
use crate::store::AggregateWriter;
use crate::types::{OrganizationId, Permission, RoleId, UserId};
use std::sync::Arc;
use tracing::info;

/// Applies mutations and keeps the resolver caches coherent
pub struct CommandHandler {
    writer: Arc<dyn AggregateWriter>,
    resolver: Arc<AuthorizationResolver>,
}

impl CommandHandler {
    pub fn new(writer: Arc<dyn AggregateWriter>, resolver: Arc<AuthorizationResolver>) -> Self {
        Self { writer, resolver }
    }

    pub fn resolver(&self) -> &Arc<AuthorizationResolver> {
        &self.resolver
    }

    /// Grant a permission to a role
    pub async fn add_permission(&self, role_id: RoleId, permission: &str) -> Result<()> {
        self.writer.add_permission(role_id, permission).await?;
        info!(role = %role_id, permission, "Permission added to role");
        self.resolver.group_invalidation(role_id).await
    }

    /// Revoke a permission from a role
    pub async fn remove_permission(&self, role_id: RoleId, permission: &str) -> Result<()> {
        self.writer.remove_permission(role_id, permission).await?;
        info!(role = %role_id, permission, "Permission removed from role");
        self.resolver.group_invalidation(role_id).await
    }

    pub async fn add_user_to_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.writer.add_user_to_role(user_id, role_id).await?;
        info!(user = %user_id, role = %role_id, "User added to role");
        self.resolver.user_invalidation(user_id).await
    }

    pub async fn remove_user_from_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.writer.remove_user_from_role(user_id, role_id).await?;
        info!(user = %user_id, role = %role_id, "User removed from role");
        self.resolver.user_invalidation(user_id).await
    }

    /// Reassign a role to another organization
    pub async fn move_role(&self, role_id: RoleId, organization_id: OrganizationId) -> Result<()> {
        self.writer.move_role(role_id, organization_id).await?;
        info!(role = %role_id, org = %organization_id, "Role moved");
        self.resolver.group_invalidation(role_id).await
    }

    /// Soft delete a role. Members keep the membership but gain nothing from it.
    pub async fn delete_role(&self, role_id: RoleId) -> Result<()> {
        self.writer.delete_role(role_id).await?;
        info!(role = %role_id, "Role deleted");
        self.resolver.group_invalidation(role_id).await
    }

    pub async fn restore_role(&self, role_id: RoleId) -> Result<()> {
        self.writer.restore_role(role_id).await?;
        info!(role = %role_id, "Role restored");
        self.resolver.group_invalidation(role_id).await
    }

    /// Create a role
    ///
    /// A fresh id has nothing cached, so no invalidation is needed.
    pub async fn create_role(
        &self,
        organization_id: OrganizationId,
        name: &str,
        system_name: &str,
        permissions: &[Permission],
    ) -> Result<RoleId> {
        let role_id = self
            .writer
            .create_role(organization_id, name, system_name, permissions)
            .await?;
        info!(role = %role_id, org = %organization_id, system_name, "Role created");
        Ok(role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryAggregateStore;
    use crate::types::{RoleAggregate, UserAggregate};

    async fn setup() -> (Arc<InMemoryAggregateStore>, CommandHandler) {
        let store = Arc::new(InMemoryAggregateStore::new());
        store
            .insert_role(RoleAggregate::new(RoleId(1), OrganizationId(1), "Staff", "staff"))
            .await;
        store
            .insert_user(UserAggregate::new(UserId(1)).with_role(RoleId(1)))
            .await;

        let resolver = Arc::new(AuthorizationResolver::new(store.clone()).unwrap());
        let handler = CommandHandler::new(store.clone(), resolver);
        (store, handler)
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let (store, handler) = setup().await;
        let resolver = handler.resolver().clone();

        assert!(!resolver.user_has_permission(UserId(1), OrganizationId(1), "x").await.unwrap());
        assert!(handler.add_permission(RoleId(99), "x").await.unwrap_err().is_not_found());

        // Entry for role 1 is still cached
        resolver.user_has_permission(UserId(1), OrganizationId(1), "x").await.unwrap();
        assert_eq!(store.role_loads(), 1);
        assert_eq!(resolver.metrics().await.invalidations, 0);
    }

    #[tokio::test]
    async fn test_create_role_then_assign() {
        let (_store, handler) = setup().await;
        let resolver = handler.resolver().clone();

        assert!(!resolver.user_has_permission(UserId(1), OrganizationId(1), "report:view").await.unwrap());

        let role_id = handler
            .create_role(OrganizationId(1), "Analysts", "analysts", &["report:view".to_string()])
            .await
            .unwrap();
        handler.add_user_to_role(UserId(1), role_id).await.unwrap();

        assert!(resolver.user_belongs_to_role(UserId(1), role_id).await.unwrap());
        assert!(resolver.user_has_permission(UserId(1), OrganizationId(1), "report:view").await.unwrap());
    }
}
