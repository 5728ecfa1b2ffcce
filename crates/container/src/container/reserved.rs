use std::collections::HashMap;

use crate::container::id::ServiceId;

/// Core framework identifiers and the parent type each override must extend
///
/// Built once with the container; the reverse map lets a request for the parent
/// type's own name land on the same reserved entry.
#[derive(Debug, Default, Clone)]
pub struct ReservedServices {
    forward: HashMap<ServiceId, ServiceId>,
    reverse: HashMap<ServiceId, ServiceId>,
}

impl ReservedServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<ServiceId>, parent: impl Into<ServiceId>) -> Self {
        self.reserve(id, parent);
        self
    }

    pub(crate) fn reserve(&mut self, id: impl Into<ServiceId>, parent: impl Into<ServiceId>) {
        let id = id.into();
        let parent = parent.into();
        self.reverse.insert(parent.clone(), id.clone());
        self.forward.insert(id, parent);
    }

    /// Reserved id for `id`, whether given as the short id or the parent type name
    pub fn canonical(&self, id: &ServiceId) -> Option<&ServiceId> {
        if let Some((reserved, _)) = self.forward.get_key_value(id) {
            return Some(reserved);
        }
        self.reverse.get(id)
    }

    pub fn parent_of(&self, id: &ServiceId) -> Option<&ServiceId> {
        self.forward.get(id)
    }

    pub fn is_reserved(&self, id: &ServiceId) -> bool {
        self.canonical(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServiceId, &ServiceId)> {
        self.forward.iter()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
