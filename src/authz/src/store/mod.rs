//! Collaborator interfaces for the aggregate store and its projection
//!
//! The resolver only reads through [`AggregateStore`] and [`ProjectionReader`].
//! Writes go through [`AggregateWriter`], normally wrapped by
//! [`CommandHandler`](crate::commands::CommandHandler) so that every mutation
//! is followed by the matching cache invalidation.

use crate::error::Result;
use crate::types::{
    OrganizationId, Permission, PermissionId, PermissionRecord, RoleAggregate, RoleId,
    UserAggregate, UserId,
};
use async_trait::async_trait;

pub mod memory;

pub use memory::InMemoryAggregateStore;

/// Read access to the event-sourced aggregate store
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Load a user's current role memberships
    ///
    /// Returns `AuthzError::NotFound` when the user does not exist.
    async fn load_user(&self, user_id: UserId) -> Result<UserAggregate>;

    /// Load a role's permissions, owning organization, names and deleted flag
    ///
    /// Returns `AuthzError::NotFound` when the role does not exist.
    async fn load_role(&self, role_id: RoleId) -> Result<RoleAggregate>;

    /// Enumerate the permission catalog
    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>>;

    /// Add a permission to the catalog, returning its identity
    async fn create_permission(&self, name: &str) -> Result<PermissionId>;
}

/// Bulk enumeration from the relational projection, used by warmup
#[async_trait]
pub trait ProjectionReader: Send + Sync {
    /// List every known role id
    async fn list_role_ids(&self) -> Result<Vec<RoleId>>;
}

/// Mutating commands applied to role and user aggregates
#[async_trait]
pub trait AggregateWriter: Send + Sync {
    async fn add_permission(&self, role_id: RoleId, permission: &str) -> Result<()>;

    async fn remove_permission(&self, role_id: RoleId, permission: &str) -> Result<()>;

    async fn add_user_to_role(&self, user_id: UserId, role_id: RoleId) -> Result<()>;

    async fn remove_user_from_role(&self, user_id: UserId, role_id: RoleId) -> Result<()>;

    /// Reassign a role to another organization
    async fn move_role(&self, role_id: RoleId, organization_id: OrganizationId) -> Result<()>;

    /// Soft delete a role
    async fn delete_role(&self, role_id: RoleId) -> Result<()>;

    async fn restore_role(&self, role_id: RoleId) -> Result<()>;

    /// Create a role, returning its assigned id
    async fn create_role(
        &self,
        organization_id: OrganizationId,
        name: &str,
        system_name: &str,
        permissions: &[Permission],
    ) -> Result<RoleId>;
}
