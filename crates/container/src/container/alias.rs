use std::collections::HashMap;

use crate::container::id::ServiceId;
use crate::error::{ContainerError, Result};

/// Alias name -> abstract identifier
///
/// Lookups follow exactly one hop: for `a -> b -> c`, `resolve(a)` is `b`.
#[derive(Debug, Default)]
pub struct AliasTable {
    aliases: HashMap<ServiceId, ServiceId>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias -> id`
    pub fn alias(&mut self, id: ServiceId, alias: ServiceId) -> Result<()> {
        if alias == id {
            return Err(ContainerError::self_alias(id.as_str()));
        }
        self.aliases.insert(alias, id);
        Ok(())
    }

    /// Single alias hop; non-aliases come back unchanged
    pub fn resolve(&self, id: &ServiceId) -> ServiceId {
        self.aliases.get(id).cloned().unwrap_or_else(|| id.clone())
    }

    pub fn get(&self, alias: &ServiceId) -> Option<&ServiceId> {
        self.aliases.get(alias)
    }

    pub fn is_alias(&self, id: &ServiceId) -> bool {
        self.aliases.contains_key(id)
    }

    pub fn remove(&mut self, alias: &ServiceId) -> Option<ServiceId> {
        self.aliases.remove(alias)
    }

    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
