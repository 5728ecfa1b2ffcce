//! Default implementations of the reserved framework services
//!
//! `config` resolves to [`ConfigRepository`] and `log` to [`LogManager`] unless
//! the application binds a type that extends them.

use std::sync::RwLock;

use serde_json::{Map, Value};

use crate::container::{Arguments, Injectable, ReservedServices, ServiceId, TypeCatalog};
use crate::error::{ContainerError, Result};

pub const CONFIG: &str = "config";
pub const LOG: &str = "log";

pub(crate) fn install(catalog: &mut TypeCatalog, reserved: &mut ReservedServices) {
    catalog.register::<ConfigRepository>();
    catalog.register::<LogManager>();
    reserved.reserve(CONFIG, ServiceId::of::<ConfigRepository>());
    reserved.reserve(LOG, ServiceId::of::<LogManager>());
}

/// Configuration values addressed by dotted keys (`database.pool.size`)
#[derive(Debug, Default)]
pub struct ConfigRepository {
    items: RwLock<Map<String, Value>>,
}

impl ConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Map<String, Value>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let items = self.items.read().ok()?;
        let mut segments = key.split('.');
        let mut current = items.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current.clone())
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, creating intermediate objects; non-object intermediates are replaced
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| ContainerError::lock("config_repository"))?;

        let mut segments: Vec<&str> = key.split('.').collect();
        let last = segments.pop().unwrap_or_default();
        let mut current = &mut *items;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut().ok_or_else(|| {
                ContainerError::resolution_failed(CONFIG, format!("'{}' is not an object", key))
            })?;
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    pub fn all(&self) -> Map<String, Value> {
        self.items.read().map(|items| items.clone()).unwrap_or_default()
    }
}

impl Injectable for ConfigRepository {
    fn construct(_args: &Arguments) -> Result<Self> {
        Ok(Self::new())
    }
}

/// Front for named log channels, backed by `tracing`
#[derive(Debug, Clone)]
pub struct LogManager {
    default_channel: String,
}

impl LogManager {
    pub fn new(default_channel: impl Into<String>) -> Self {
        Self {
            default_channel: default_channel.into(),
        }
    }

    pub fn default_channel(&self) -> &str {
        &self.default_channel
    }

    pub fn channel(&self, name: impl Into<String>) -> LogChannel {
        LogChannel { name: name.into() }
    }

    pub fn info(&self, message: &str) {
        self.channel(self.default_channel.clone()).info(message);
    }

    pub fn warning(&self, message: &str) {
        self.channel(self.default_channel.clone()).warning(message);
    }

    pub fn error(&self, message: &str) {
        self.channel(self.default_channel.clone()).error(message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("stack")
    }
}

impl Injectable for LogManager {
    fn construct(_args: &Arguments) -> Result<Self> {
        Ok(Self::default())
    }
}

#[derive(Debug, Clone)]
pub struct LogChannel {
    name: String,
}

impl LogChannel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(channel = %self.name, "{}", message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!(channel = %self.name, "{}", message);
    }

    pub fn warning(&self, message: &str) {
        tracing::warn!(channel = %self.name, "{}", message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!(channel = %self.name, "{}", message);
    }
}
