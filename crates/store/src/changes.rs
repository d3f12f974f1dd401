//! Realtime instance change feed.
//!
//! The store publishes one [`InstanceChange`] per instance mutation on a
//! broadcast channel. Consumers hold an [`InstanceMirror`]: an explicit
//! reducer that applies insert/update/delete patches to an id-keyed map.
//! A temporary disconnect (broadcast lag) can drop intermediate updates;
//! `resync` against the store is the fallback correctness mechanism, giving
//! eventual convergence rather than a realtime guarantee.

use std::collections::HashMap;

use uuid::Uuid;

use campzap_core::types::Instance;

use crate::store::TenantStore;

#[derive(Debug, Clone)]
pub enum InstanceChange {
    Inserted(Instance),
    Updated(Instance),
    Deleted(Uuid),
}

/// Tenant-local mirror of the instance table, fed by the change stream.
#[derive(Debug)]
pub struct InstanceMirror {
    tenant_id: Uuid,
    instances: HashMap<Uuid, Instance>,
}

impl InstanceMirror {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            instances: HashMap::new(),
        }
    }

    /// Apply a single change. Changes for other tenants are ignored; a
    /// delete for an unknown id is a no-op (the insert may have been missed,
    /// in which case there is nothing to remove anyway).
    pub fn apply(&mut self, change: InstanceChange) {
        match change {
            InstanceChange::Inserted(instance) | InstanceChange::Updated(instance) => {
                if instance.tenant_id == self.tenant_id {
                    self.instances.insert(instance.id, instance);
                }
            }
            InstanceChange::Deleted(id) => {
                self.instances.remove(&id);
            }
        }
    }

    /// Replace the mirror with the store's current truth. Call after a
    /// broadcast `Lagged` error or on periodic refresh.
    pub fn resync(&mut self, store: &TenantStore) {
        self.instances = store
            .list_instances(self.tenant_id)
            .into_iter()
            .map(|i| (i.id, i))
            .collect();
    }

    /// Current view, newest first.
    pub fn snapshot(&self) -> Vec<Instance> {
        let mut rows: Vec<Instance> = self.instances.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
