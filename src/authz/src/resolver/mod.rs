//! Organization-scoped permission resolution
//!
//! Answers "does user U have permission P in organization O?" from two
//! bounded LRU caches sitting in front of the aggregate store:
//!
//! ```text
//! user_has_permission(U, O, P)
//!     │
//!     ├─ membership cache ── miss ──→ AggregateStore::load_user
//!     │      U → [R1, R2, ...]
//!     │
//!     └─ permission cache ── miss ──→ AggregateStore::load_role
//!            Ri → (org, {perms}, deleted)
//! ```
//!
//! Loads happen with no cache lock held. Failed loads are never cached.
//! Mutations must be followed by [`AuthorizationResolver::group_invalidation`]
//! or [`AuthorizationResolver::user_invalidation`]; the
//! [`CommandHandler`](crate::commands::CommandHandler) does this for every
//! command it applies.

pub mod cache;
pub mod metrics;

pub use cache::{ResolverCacheStats, RolePermissionCacheEntry, UserMembershipCacheEntry};
pub use metrics::{MetricsCollector, ResolverMetrics};

use crate::catalog::PermissionCatalog;
use crate::config::ResolverConfig;
use crate::error::Result;
use crate::store::{AggregateStore, ProjectionReader};
use crate::types::{OrganizationId, Permission, RoleId, UserId};
use cache::{MembershipCache, PermissionCache};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Roles loaded in parallel during warmup
const WARMUP_CONCURRENCY: usize = 16;

/// Outcome of a warmup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmupReport {
    /// Permissions added to the catalog
    pub permissions_created: usize,

    /// Roles loaded into the permission cache
    pub roles_warmed: usize,

    /// Roles whose load failed and were left to lazy loading
    pub roles_skipped: Vec<RoleId>,
}

/// Builder for [`AuthorizationResolver`]
pub struct ResolverBuilder {
    store: Arc<dyn AggregateStore>,
    projection: Option<Arc<dyn ProjectionReader>>,
    config: ResolverConfig,
}

impl ResolverBuilder {
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Projection used by warmup to enumerate roles
    pub fn projection(mut self, projection: Arc<dyn ProjectionReader>) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn build(self) -> Result<AuthorizationResolver> {
        self.config.validate()?;

        info!(
            membership_cache_size = self.config.membership_cache_size,
            permission_cache_size = self.config.permission_cache_size,
            projection = self.projection.is_some(),
            "AuthorizationResolver initialized"
        );

        Ok(AuthorizationResolver {
            memberships: MembershipCache::new(self.config.membership_cache_size),
            permissions: PermissionCache::new(self.config.permission_cache_size),
            membership_epoch: AtomicU64::new(0),
            permission_epoch: AtomicU64::new(0),
            catalog: PermissionCatalog::new(),
            metrics: MetricsCollector::new(),
            store: self.store,
            projection: self.projection,
            config: self.config,
        })
    }
}

/// Permission-checking service with bounded membership and role caches
///
/// Shared across tasks behind an `Arc`. The two caches are independent and
/// never locked together.
pub struct AuthorizationResolver {
    store: Arc<dyn AggregateStore>,
    projection: Option<Arc<dyn ProjectionReader>>,

    /// user id → role memberships
    memberships: MembershipCache,

    /// role id → organization and permission set
    permissions: PermissionCache,

    /// Bumped on every invalidation. A load that observes a change while it
    /// was in flight drops its write-back, so a stale snapshot never outlives
    /// the invalidation that raced it.
    membership_epoch: AtomicU64,
    permission_epoch: AtomicU64,

    catalog: PermissionCatalog,
    metrics: MetricsCollector,
    config: ResolverConfig,
}

impl AuthorizationResolver {
    pub fn builder(store: Arc<dyn AggregateStore>) -> ResolverBuilder {
        ResolverBuilder {
            store,
            projection: None,
            config: ResolverConfig::default(),
        }
    }

    /// Resolver over `store` with default configuration and no projection
    pub fn new(store: Arc<dyn AggregateStore>) -> Result<Self> {
        Self::builder(store).build()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The permission catalog populated by warmup
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Whether `user_id` is a member of `role_id`
    pub async fn user_belongs_to_role(&self, user_id: UserId, role_id: RoleId) -> Result<bool> {
        let membership = self.membership(user_id).await?;
        Ok(membership.contains(role_id))
    }

    /// Whether any of the user's roles owned by `organization_id` grants `permission`
    ///
    /// Pass [`OrganizationId::ANY`] to ignore organization scoping. Errors
    /// mean "unknown" and must be treated as a denial.
    pub async fn user_has_permission(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        permission: &str,
    ) -> Result<bool> {
        let start = Instant::now();

        let membership = self.membership(user_id).await?;
        let mut allowed = false;

        for role_id in &membership.role_ids {
            let role = self.role_permissions(*role_id).await?;

            // Roles owned by other organizations never grant here
            if role.grants(organization_id, permission) {
                debug!(user = %user_id, role = %role_id, org = %organization_id, permission, "Permission granted");
                allowed = true;
                break;
            }
        }

        self.metrics.record_check(allowed, start.elapsed()).await;
        Ok(allowed)
    }

    /// [`user_has_permission`](Self::user_has_permission) collapsed to a
    /// boolean: unresolved checks fail closed
    pub async fn check_or_deny(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        permission: &str,
    ) -> bool {
        match self.user_has_permission(user_id, organization_id, permission).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(user = %user_id, org = %organization_id, permission, error = %e, "Permission check failed, denying");
                false
            }
        }
    }

    /// Role ids the user is a member of, in stored order
    pub async fn user_roles(&self, user_id: UserId) -> Result<Vec<RoleId>> {
        Ok(self.membership(user_id).await?.role_ids.clone())
    }

    /// Every permission the user holds in `organization_id`
    pub async fn user_permissions(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<BTreeSet<Permission>> {
        let membership = self.membership(user_id).await?;
        let mut granted = BTreeSet::new();

        for role_id in &membership.role_ids {
            let role = self.role_permissions(*role_id).await?;
            if !role.deleted && organization_id.admits(role.organization_id) {
                granted.extend(role.permissions.iter().cloned());
            }
        }

        Ok(granted)
    }

    /// Drop the cached permission set of a role
    ///
    /// Call after changing the role's permissions, organization or deleted flag.
    pub async fn group_invalidation(&self, role_id: RoleId) -> Result<()> {
        self.permission_epoch.fetch_add(1, Ordering::SeqCst);
        let evicted = self.permissions.remove(&role_id);

        debug!(role = %role_id, evicted, "Role permission cache invalidated");
        self.metrics.record_invalidation().await;
        Ok(())
    }

    /// Drop the cached role memberships of a user
    ///
    /// Call after adding the user to or removing them from any role.
    pub async fn user_invalidation(&self, user_id: UserId) -> Result<()> {
        self.membership_epoch.fetch_add(1, Ordering::SeqCst);
        let evicted = self.memberships.remove(&user_id);

        debug!(user = %user_id, evicted, "User membership cache invalidated");
        self.metrics.record_invalidation().await;
        Ok(())
    }

    /// Drop every cached entry
    pub fn invalidate_all(&self) {
        self.membership_epoch.fetch_add(1, Ordering::SeqCst);
        self.permission_epoch.fetch_add(1, Ordering::SeqCst);
        self.memberships.clear();
        self.permissions.clear();
        info!("Authorization caches cleared");
    }

    /// Prepare the resolver for traffic
    ///
    /// Creates any of `known_permissions` missing from the catalog (a creation
    /// failure aborts warmup), then loads every role listed by the projection
    /// into the permission cache. Roles that fail to load are logged and left
    /// to lazy loading.
    pub async fn warmup<I>(&self, known_permissions: I) -> Result<WarmupReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let start = Instant::now();
        let permissions_created = self
            .catalog
            .ensure(self.store.as_ref(), known_permissions)
            .await?;

        let mut report = WarmupReport {
            permissions_created,
            ..Default::default()
        };

        let Some(projection) = &self.projection else {
            info!(permissions_created, "Warmup finished without a projection, roles load lazily");
            self.metrics.record_warmup(0).await;
            return Ok(report);
        };

        let role_ids = projection.list_role_ids().await?;
        debug!(count = role_ids.len(), "Warming role permission cache");

        let mut loads = stream::iter(role_ids)
            .map(|role_id| async move { (role_id, self.load_role(role_id).await) })
            .buffer_unordered(WARMUP_CONCURRENCY);

        while let Some((role_id, loaded)) = loads.next().await {
            match loaded {
                Ok(_) => report.roles_warmed += 1,
                Err(e) => {
                    warn!(role = %role_id, error = %e, "Skipping role during warmup");
                    report.roles_skipped.push(role_id);
                }
            }
        }
        report.roles_skipped.sort();

        self.metrics.record_warmup(report.roles_skipped.len()).await;
        info!(
            permissions_created = report.permissions_created,
            roles_warmed = report.roles_warmed,
            roles_skipped = report.roles_skipped.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Warmup complete"
        );

        Ok(report)
    }

    /// Warm up with the permission list from the configuration, if enabled
    pub async fn warmup_from_config(&self) -> Result<Option<WarmupReport>> {
        if !self.config.warmup_on_start {
            debug!("Warmup disabled by configuration");
            return Ok(None);
        }

        self.warmup(&self.config.known_permissions).await.map(Some)
    }

    pub fn cache_stats(&self) -> ResolverCacheStats {
        ResolverCacheStats {
            membership: self.memberships.stats(),
            permissions: self.permissions.stats(),
        }
    }

    pub async fn metrics(&self) -> ResolverMetrics {
        self.metrics.get_metrics().await
    }

    async fn membership(&self, user_id: UserId) -> Result<Arc<UserMembershipCacheEntry>> {
        if let Some(entry) = self.memberships.get(&user_id) {
            return Ok(entry);
        }

        debug!(user = %user_id, "Membership cache miss");
        let epoch = self.membership_epoch.load(Ordering::SeqCst);

        let user = match self.store.load_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                self.metrics.record_load_error().await;
                return Err(e);
            }
        };

        let entry = Arc::new(UserMembershipCacheEntry::from(user));
        self.memberships.put(user_id, Arc::clone(&entry));
        if self.membership_epoch.load(Ordering::SeqCst) != epoch {
            self.memberships.remove(&user_id);
        }

        Ok(entry)
    }

    async fn role_permissions(&self, role_id: RoleId) -> Result<Arc<RolePermissionCacheEntry>> {
        if let Some(entry) = self.permissions.get(&role_id) {
            return Ok(entry);
        }

        debug!(role = %role_id, "Role permission cache miss");
        self.load_role(role_id).await
    }

    /// Load a role from the store and write it back to the permission cache
    async fn load_role(&self, role_id: RoleId) -> Result<Arc<RolePermissionCacheEntry>> {
        let epoch = self.permission_epoch.load(Ordering::SeqCst);

        let role = match self.store.load_role(role_id).await {
            Ok(role) => role,
            Err(e) => {
                self.metrics.record_load_error().await;
                return Err(e);
            }
        };

        let entry = Arc::new(RolePermissionCacheEntry::from(role));
        self.permissions.put(role_id, Arc::clone(&entry));
        if self.permission_epoch.load(Ordering::SeqCst) != epoch {
            self.permissions.remove(&role_id);
        }

        Ok(entry)
    }
}
