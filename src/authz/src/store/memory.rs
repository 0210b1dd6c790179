//! In-memory aggregate store

use super::{AggregateStore, AggregateWriter, ProjectionReader};
use crate::error::{AuthzError, Result};
use crate::types::{
    OrganizationId, Permission, PermissionId, PermissionRecord, RoleAggregate, RoleId,
    UserAggregate, UserId,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, UserAggregate>,
    roles: BTreeMap<RoleId, RoleAggregate>,
    permissions: BTreeMap<Permission, PermissionId>,
    next_role_id: i64,
    next_permission_id: i64,
    /// Roles whose loads fail with `UnavailableSource`
    failing_roles: HashSet<RoleId>,
    /// Permission names the catalog refuses to create
    rejected_permissions: HashSet<Permission>,
}

/// Aggregate store kept entirely in memory
///
/// Implements every collaborator trait so it can back a resolver and its
/// command handler in embedded setups and tests. Load counters and fault
/// injection make cache behaviour observable.
#[derive(Clone, Default)]
pub struct InMemoryAggregateStore {
    state: Arc<RwLock<StoreState>>,
    unavailable: Arc<AtomicBool>,
    user_loads: Arc<AtomicUsize>,
    role_loads: Arc<AtomicUsize>,
    permissions_created: Arc<AtomicUsize>,
}

impl InMemoryAggregateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user aggregate
    pub async fn insert_user(&self, user: UserAggregate) {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user);
    }

    /// Insert or replace a role aggregate
    pub async fn insert_role(&self, role: RoleAggregate) {
        let mut state = self.state.write().await;
        state.next_role_id = state.next_role_id.max(role.id.get());
        state.roles.insert(role.id, role);
    }

    /// Make every call fail with `UnavailableSource` while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make loads of one role fail with `UnavailableSource`
    pub async fn fail_role(&self, role_id: RoleId) {
        self.state.write().await.failing_roles.insert(role_id);
    }

    /// Make catalog creation of one permission name fail
    pub async fn reject_permission(&self, name: impl Into<Permission>) {
        self.state.write().await.rejected_permissions.insert(name.into());
    }

    pub fn user_loads(&self) -> usize {
        self.user_loads.load(Ordering::SeqCst)
    }

    pub fn role_loads(&self) -> usize {
        self.role_loads.load(Ordering::SeqCst)
    }

    pub fn permissions_created(&self) -> usize {
        self.permissions_created.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthzError::UnavailableSource(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn role_mut(state: &mut StoreState, role_id: RoleId) -> Result<&mut RoleAggregate> {
    state
        .roles
        .get_mut(&role_id)
        .ok_or_else(|| AuthzError::role_not_found(role_id))
}

#[async_trait]
impl AggregateStore for InMemoryAggregateStore {
    async fn load_user(&self, user_id: UserId) -> Result<UserAggregate> {
        self.check_available()?;
        self.user_loads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AuthzError::user_not_found(user_id))
    }

    async fn load_role(&self, role_id: RoleId) -> Result<RoleAggregate> {
        self.check_available()?;
        self.role_loads.fetch_add(1, Ordering::SeqCst);

        let state = self.state.read().await;
        if state.failing_roles.contains(&role_id) {
            return Err(AuthzError::UnavailableSource(format!(
                "role {} could not be replayed",
                role_id
            )));
        }

        state
            .roles
            .get(&role_id)
            .cloned()
            .ok_or_else(|| AuthzError::role_not_found(role_id))
    }

    async fn list_permissions(&self) -> Result<Vec<PermissionRecord>> {
        self.check_available()?;

        let state = self.state.read().await;
        Ok(state
            .permissions
            .iter()
            .map(|(name, id)| PermissionRecord {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn create_permission(&self, name: &str) -> Result<PermissionId> {
        self.check_available()?;

        let mut state = self.state.write().await;
        if state.rejected_permissions.contains(name) {
            return Err(AuthzError::UnavailableSource(format!(
                "permission catalog rejected '{}'",
                name
            )));
        }
        if state.permissions.contains_key(name) {
            return Err(AuthzError::InvalidInput(format!(
                "permission '{}' already exists",
                name
            )));
        }

        state.next_permission_id += 1;
        let id = PermissionId(state.next_permission_id);
        state.permissions.insert(name.to_string(), id);
        self.permissions_created.fetch_add(1, Ordering::SeqCst);

        Ok(id)
    }
}

#[async_trait]
impl ProjectionReader for InMemoryAggregateStore {
    async fn list_role_ids(&self) -> Result<Vec<RoleId>> {
        self.check_available()?;

        let state = self.state.read().await;
        Ok(state.roles.keys().copied().collect())
    }
}

#[async_trait]
impl AggregateWriter for InMemoryAggregateStore {
    async fn add_permission(&self, role_id: RoleId, permission: &str) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        role_mut(&mut state, role_id)?
            .permissions
            .insert(permission.to_string());
        Ok(())
    }

    async fn remove_permission(&self, role_id: RoleId, permission: &str) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        role_mut(&mut state, role_id)?.permissions.remove(permission);
        Ok(())
    }

    async fn add_user_to_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        if !state.roles.contains_key(&role_id) {
            return Err(AuthzError::role_not_found(role_id));
        }

        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;
        if !user.role_ids.contains(&role_id) {
            user.role_ids.push(role_id);
        }
        Ok(())
    }

    async fn remove_user_from_role(&self, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AuthzError::user_not_found(user_id))?;
        user.role_ids.retain(|id| *id != role_id);
        Ok(())
    }

    async fn move_role(&self, role_id: RoleId, organization_id: OrganizationId) -> Result<()> {
        self.check_available()?;

        if organization_id.is_any() {
            return Err(AuthzError::InvalidInput(
                "a role must belong to a concrete organization".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        role_mut(&mut state, role_id)?.organization_id = organization_id;
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        role_mut(&mut state, role_id)?.deleted = true;
        Ok(())
    }

    async fn restore_role(&self, role_id: RoleId) -> Result<()> {
        self.check_available()?;

        let mut state = self.state.write().await;
        role_mut(&mut state, role_id)?.deleted = false;
        Ok(())
    }

    async fn create_role(
        &self,
        organization_id: OrganizationId,
        name: &str,
        system_name: &str,
        permissions: &[Permission],
    ) -> Result<RoleId> {
        self.check_available()?;

        if organization_id.is_any() {
            return Err(AuthzError::InvalidInput(
                "a role must belong to a concrete organization".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        state.next_role_id += 1;
        let id = RoleId(state.next_role_id);

        let mut role = RoleAggregate::new(id, organization_id, name, system_name);
        role.permissions.extend(permissions.iter().cloned());
        state.roles.insert(id, role);

        Ok(id)
    }
}
