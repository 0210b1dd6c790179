//! Snapshot entries held by the resolver caches

use crate::types::{OrganizationId, Permission, RoleAggregate, RoleId, UserAggregate, UserId};
use keyward_collections::{BoundedCache, CacheStats};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A user's role memberships at load time
///
/// Never mutated after construction; a reload replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMembershipCacheEntry {
    pub user_id: UserId,
    pub role_ids: Vec<RoleId>,
}

impl UserMembershipCacheEntry {
    pub fn contains(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }
}

impl From<UserAggregate> for UserMembershipCacheEntry {
    fn from(user: UserAggregate) -> Self {
        Self {
            user_id: user.id,
            role_ids: user.role_ids,
        }
    }
}

/// One role's granted permissions and owning organization at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionCacheEntry {
    pub role_id: RoleId,
    pub organization_id: OrganizationId,
    pub permissions: BTreeSet<Permission>,

    /// Soft-deleted roles grant nothing
    pub deleted: bool,
}

impl RolePermissionCacheEntry {
    /// Whether this role grants `permission` for a check scoped to `organization_id`
    pub fn grants(&self, organization_id: OrganizationId, permission: &str) -> bool {
        !self.deleted
            && organization_id.admits(self.organization_id)
            && self.permissions.contains(permission)
    }
}

impl From<RoleAggregate> for RolePermissionCacheEntry {
    fn from(role: RoleAggregate) -> Self {
        Self {
            role_id: role.id,
            organization_id: role.organization_id,
            permissions: role.permissions,
            deleted: role.deleted,
        }
    }
}

pub(crate) type MembershipCache = BoundedCache<UserId, Arc<UserMembershipCacheEntry>>;

pub(crate) type PermissionCache = BoundedCache<RoleId, Arc<RolePermissionCacheEntry>>;

/// Statistics for both resolver caches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverCacheStats {
    pub membership: CacheStats,
    pub permissions: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(org: i64, deleted: bool) -> RolePermissionCacheEntry {
        let mut aggregate = RoleAggregate::new(RoleId(1), OrganizationId(org), "Editors", "editors")
            .with_permission("post:edit");
        aggregate.deleted = deleted;
        aggregate.into()
    }

    #[test]
    fn test_grants_scoped_to_owner() {
        let entry = role(1, false);

        assert!(entry.grants(OrganizationId(1), "post:edit"));
        assert!(!entry.grants(OrganizationId(2), "post:edit"));
        assert!(!entry.grants(OrganizationId(1), "post:delete"));
        assert!(entry.grants(OrganizationId::ANY, "post:edit"));
    }

    #[test]
    fn test_deleted_role_grants_nothing() {
        let entry = role(1, true);

        assert!(!entry.grants(OrganizationId(1), "post:edit"));
        assert!(!entry.grants(OrganizationId::ANY, "post:edit"));
    }

    #[test]
    fn test_membership_entry_from_aggregate() {
        let entry: UserMembershipCacheEntry = UserAggregate::new(UserId(3))
            .with_role(RoleId(7))
            .with_role(RoleId(2))
            .into();

        assert_eq!(entry.role_ids, vec![RoleId(7), RoleId(2)]);
        assert!(entry.contains(RoleId(2)));
        assert!(!entry.contains(RoleId(3)));
    }
}
