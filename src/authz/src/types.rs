//! Core authorization types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque permission name (e.g. `"user:create"`), compared by exact string match
pub type Permission = String;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, ":{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// User identifier
    UserId,
    "user"
);

entity_id!(
    /// Role identifier
    RoleId,
    "role"
);

entity_id!(
    /// Organization identifier
    OrganizationId,
    "org"
);

entity_id!(
    /// Permission catalog entry identifier
    PermissionId,
    "permission"
);

impl OrganizationId {
    /// Sentinel matching roles of every organization.
    ///
    /// Checks made with this value ignore organization scoping entirely.
    /// Zero and other defaulted ids are ordinary organizations.
    pub const ANY: OrganizationId = OrganizationId(i64::MIN);

    pub const fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    /// Whether a role owned by `owner` is in scope for a check against `self`
    pub fn admits(self, owner: OrganizationId) -> bool {
        self.is_any() || self == owner
    }
}

/// User read model as returned by the aggregate store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAggregate {
    pub id: UserId,

    /// Role memberships, possibly spanning organizations
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
}

impl UserAggregate {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            role_ids: Vec::new(),
        }
    }

    pub fn with_role(mut self, role_id: RoleId) -> Self {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
        self
    }
}

/// Role read model as returned by the aggregate store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAggregate {
    pub id: RoleId,

    /// Owning organization
    pub organization_id: OrganizationId,

    /// Human readable name
    pub name: String,

    /// Stable machine name (e.g. "org_admin")
    pub system_name: String,

    /// Granted permissions, no duplicates
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,

    /// Soft delete marker. The id and permission set are kept.
    #[serde(default)]
    pub deleted: bool,
}

impl RoleAggregate {
    pub fn new(
        id: RoleId,
        organization_id: OrganizationId,
        name: impl Into<String>,
        system_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            organization_id,
            name: name.into(),
            system_name: system_name.into(),
            permissions: BTreeSet::new(),
            deleted: false,
        }
    }

    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }
}

/// Permission catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: PermissionId,
    pub name: Permission,
}
