//! Error types for the authorization engine

use crate::types::{RoleId, UserId};
use thiserror::Error;

/// Kind of aggregate a lookup was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Role,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Role => "role",
        };
        f.write_str(name)
    }
}

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Requested user or role does not exist in the source of truth
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    /// Aggregate store or projection could not serve the request
    #[error("Source unavailable: {0}")]
    UnavailableSource(String),

    /// A missing permission could not be added to the catalog during warmup
    #[error("Failed to create permission '{name}': {reason}")]
    CatalogCreationFailed { name: String, reason: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    pub fn user_not_found(id: UserId) -> Self {
        AuthzError::NotFound {
            kind: EntityKind::User,
            id: id.get(),
        }
    }

    pub fn role_not_found(id: RoleId) -> Self {
        AuthzError::NotFound {
            kind: EntityKind::Role,
            id: id.get(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthzError::NotFound { .. })
    }

    /// Whether a caller may retry later with a chance of success
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthzError::UnavailableSource(_))
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(AuthzError::user_not_found(UserId(4)).to_string(), "user 4 not found");
        assert_eq!(AuthzError::role_not_found(RoleId(9)).to_string(), "role 9 not found");
    }

    #[test]
    fn test_classification() {
        let unavailable = AuthzError::UnavailableSource("connection reset".into());
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_not_found());

        let missing = AuthzError::role_not_found(RoleId(1));
        assert!(missing.is_not_found());
        assert!(!missing.is_transient());
    }
}
