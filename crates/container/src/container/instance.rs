use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::container::id::ServiceId;
use crate::error::{ContainerError, Result};

/// Named parameters handed to `make_with`, factories and constructor overrides
pub type Parameters = serde_json::Map<String, Value>;

/// A constructed service value
///
/// Keeps the runtime type name next to the erased value so the container can
/// alias the concrete type back to the id it was requested under.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing shared value without re-allocating it
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Runtime type of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> ServiceId {
        ServiceId::from(self.type_name)
    }

    pub fn is<T: Send + Sync + 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.clone().downcast::<T>().ok()
    }

    /// Whether both handles point at the same allocation
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.value) as *const (),
            Arc::as_ptr(&other.value) as *const (),
        )
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A single resolved constructor argument
#[derive(Debug, Clone)]
pub enum Argument {
    /// A dependency resolved from the container
    Service(Instance),
    /// A builtin value: an override, a default, or null
    Value(Value),
}

/// Ordered, named argument list for a type's constructor
#[derive(Debug, Clone)]
pub struct Arguments {
    service: ServiceId,
    entries: Vec<(String, Argument)>,
}

impl Arguments {
    pub fn new(service: impl Into<ServiceId>) -> Self {
        Self {
            service: service.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_service(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.push(name, Argument::Service(instance));
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.push(name, Argument::Value(value));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, argument: Argument) {
        self.entries.push((name.into(), argument));
    }

    /// Type being constructed
    pub fn service_id(&self) -> &ServiceId {
        &self.service
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, argument)| argument)
    }

    fn require(&self, name: &str) -> Result<&Argument> {
        self.get(name).ok_or_else(|| {
            ContainerError::resolution_failed(
                self.service.as_str(),
                format!("constructor argument '{}' was not supplied", name),
            )
        })
    }

    pub fn instance(&self, name: &str) -> Result<Instance> {
        match self.require(name)? {
            Argument::Service(instance) => Ok(instance.clone()),
            Argument::Value(_) => Err(ContainerError::argument_mismatch(name, "service")),
        }
    }

    /// Resolved dependency, downcast to its concrete type
    pub fn service<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        self.instance(name)?
            .downcast::<T>()
            .ok_or_else(|| ContainerError::argument_mismatch(name, std::any::type_name::<T>()))
    }

    /// Builtin argument, deserialized into `T` (`Option<T>` accepts null)
    pub fn value<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        match self.require(name)? {
            Argument::Value(value) => serde_json::from_value(value.clone()).map_err(|_| {
                ContainerError::argument_mismatch(name, std::any::type_name::<T>())
            }),
            Argument::Service(_) => {
                Err(ContainerError::argument_mismatch(name, std::any::type_name::<T>()))
            }
        }
    }
}
