use std::collections::HashMap;

use crate::container::id::ServiceId;
use crate::container::instance::Instance;

/// Shared instances that have been constructed at least once
///
/// Presence of an entry is the "resolved" marker.
#[derive(Debug, Default)]
pub struct InstanceCache {
    instances: HashMap<ServiceId, Instance>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ServiceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn is_resolved(&self, id: &ServiceId) -> bool {
        self.instances.contains_key(id)
    }

    /// Store `instance` unless another one got there first; returns the one kept
    pub fn insert_if_absent(&mut self, id: ServiceId, instance: Instance) -> Instance {
        self.instances.entry(id).or_insert(instance).clone()
    }

    pub fn forget(&mut self, id: &ServiceId) -> Option<Instance> {
        self.instances.remove(id)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
