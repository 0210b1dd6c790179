//! Permission catalog owned by a resolver instance

use crate::error::{AuthzError, Result};
use crate::store::AggregateStore;
use crate::types::{Permission, PermissionId, PermissionRecord};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Name → id index of known permissions
///
/// Filled from the aggregate store by [`ensure`](Self::ensure). Reads take a
/// shared lock, refreshes take the exclusive lock only while swapping entries
/// in, never across store I/O.
#[derive(Debug, Default)]
pub struct PermissionCatalog {
    entries: RwLock<HashMap<Permission, PermissionId>>,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &str) -> Option<PermissionId> {
        self.entries.read().get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of catalog names
    pub fn names(&self) -> Vec<Permission> {
        let mut names: Vec<Permission> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn record(&self, records: impl IntoIterator<Item = PermissionRecord>) {
        let mut entries = self.entries.write();
        for record in records {
            entries.insert(record.name, record.id);
        }
    }

    /// Make sure every name exists in the store's catalog
    ///
    /// Reloads the catalog from the store, creates whatever is still missing
    /// and returns how many entries were created. Calling it again with the
    /// same names creates nothing.
    pub async fn ensure<S, I>(&self, store: &S, names: I) -> Result<usize>
    where
        S: AggregateStore + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let existing = store.list_permissions().await?;
        debug!(count = existing.len(), "Loaded permission catalog");
        self.record(existing);

        let mut created = 0;
        for name in names {
            let name = name.as_ref();
            if self.contains(name) {
                continue;
            }

            match store.create_permission(name).await {
                Ok(id) => {
                    self.record([PermissionRecord {
                        id,
                        name: name.to_string(),
                    }]);
                    created += 1;
                    info!(permission = %name, id = %id, "Created missing permission");
                }
                Err(e) => {
                    // Another writer may have created it since the catalog was listed
                    if self.adopt_existing(store, name).await {
                        debug!(permission = %name, "Permission created concurrently");
                        continue;
                    }

                    return Err(AuthzError::CatalogCreationFailed {
                        name: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(created)
    }

    /// Re-list the store and record `name` if it now exists
    async fn adopt_existing<S>(&self, store: &S, name: &str) -> bool
    where
        S: AggregateStore + ?Sized,
    {
        match store.list_permissions().await {
            Ok(records) => {
                self.record(records);
                self.contains(name)
            }
            Err(e) => {
                warn!(permission = %name, error = %e, "Could not re-list permission catalog");
                false
            }
        }
    }
}
