//! # Keyward Authorization Engine
//!
//! Organization-scoped permission resolution over an event-sourced
//! aggregate store.
//!
//! ## Features
//!
//! - **Bounded LRU caches** for user memberships and role permission sets
//! - **Organization scoping**: a role only grants within the organization that owns it
//! - **Explicit invalidation** wired into every mutation by [`CommandHandler`]
//! - **Warmup** of the permission catalog and role cache at startup
//! - **Async-first design** using the Tokio runtime
//!
//! ## Example
//!
//! ```rust
//! use keyward_authz::{
//!     AuthorizationResolver, InMemoryAggregateStore, OrganizationId, RoleAggregate, RoleId,
//!     UserAggregate, UserId,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryAggregateStore::new());
//!     store
//!         .insert_role(
//!             RoleAggregate::new(RoleId(1), OrganizationId(7), "Admins", "admins")
//!                 .with_permission("user:create"),
//!         )
//!         .await;
//!     store.insert_user(UserAggregate::new(UserId(42)).with_role(RoleId(1))).await;
//!
//!     let resolver = AuthorizationResolver::builder(store.clone())
//!         .projection(store)
//!         .build()?;
//!     resolver.warmup(["user:create"]).await?;
//!
//!     assert!(resolver.user_has_permission(UserId(42), OrganizationId(7), "user:create").await?);
//!     assert!(!resolver.user_has_permission(UserId(42), OrganizationId(8), "user:create").await?);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod resolver;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalog::PermissionCatalog;
pub use commands::CommandHandler;
pub use config::ResolverConfig;
pub use error::{AuthzError, EntityKind, Result};
pub use resolver::{
    AuthorizationResolver, ResolverBuilder, ResolverCacheStats, ResolverMetrics,
    RolePermissionCacheEntry, UserMembershipCacheEntry, WarmupReport,
};
pub use store::{AggregateStore, AggregateWriter, InMemoryAggregateStore, ProjectionReader};
pub use types::{
    OrganizationId, Permission, PermissionId, PermissionRecord, RoleAggregate, RoleId,
    UserAggregate, UserId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
