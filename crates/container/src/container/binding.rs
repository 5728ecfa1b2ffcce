use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::container::id::ServiceId;
use crate::container::instance::{Instance, Parameters};
use crate::container::resolver::Resolver;
use crate::error::Result;

/// Factory closure backing a binding
pub type Factory = Arc<dyn Fn(&mut Resolver<'_>, &Parameters) -> Result<Instance> + Send + Sync>;

/// How a binding produces its value
#[derive(Clone)]
pub enum Concrete {
    /// Invoked with the parameters passed to `make`
    Factory(Factory),
    /// Returned as-is
    Instance(Instance),
    /// Type name to autowire
    Type(ServiceId),
}

impl Concrete {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&mut Resolver<'_>, &Parameters) -> Result<Instance> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(factory))
    }

    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Concrete::Instance(Instance::new(value))
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Concrete::Type(ServiceId::of::<T>())
    }

    pub fn type_name(id: impl Into<ServiceId>) -> Self {
        Concrete::Type(id.into())
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Concrete::Factory(_))
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Factory(_) => write!(f, "Factory(<factory_fn>)"),
            Concrete::Instance(instance) => f.debug_tuple("Instance").field(instance).finish(),
            Concrete::Type(id) => f.debug_tuple("Type").field(id).finish(),
        }
    }
}

impl From<Instance> for Concrete {
    fn from(instance: Instance) -> Self {
        Concrete::Instance(instance)
    }
}

impl From<ServiceId> for Concrete {
    fn from(id: ServiceId) -> Self {
        Concrete::Type(id)
    }
}

impl From<&'static str> for Concrete {
    fn from(id: &'static str) -> Self {
        Concrete::Type(ServiceId::from(id))
    }
}

/// Registry entry for one abstract identifier
#[derive(Debug, Clone)]
pub struct Binding {
    /// `None` means the identifier itself names the type to build
    pub concrete: Option<Concrete>,
    pub shared: bool,
}

/// Bindings keyed by abstract identifier
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<ServiceId, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding, replacing any previous one
    pub fn bind(&mut self, id: ServiceId, concrete: Option<Concrete>, shared: bool) {
        self.bindings.insert(id, Binding { concrete, shared });
    }

    /// Register only when `id` has no binding yet; returns whether it did
    pub fn bind_if(&mut self, id: ServiceId, concrete: Option<Concrete>, shared: bool) -> bool {
        if self.bindings.contains_key(&id) {
            return false;
        }
        self.bind(id, concrete, shared);
        true
    }

    pub fn get(&self, id: &ServiceId) -> Option<&Binding> {
        self.bindings.get(id)
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.bindings.contains_key(id)
    }

    pub fn is_shared(&self, id: &ServiceId) -> bool {
        self.bindings.get(id).map(|b| b.shared).unwrap_or(false)
    }

    /// Make a constructed value the binding's future concrete
    ///
    /// A shared store also marks an existing binding shared.
    pub fn store_instance(&mut self, id: &ServiceId, instance: Instance, shared: bool) {
        match self.bindings.get_mut(id) {
            Some(binding) => {
                binding.concrete = Some(Concrete::Instance(instance));
                binding.shared |= shared;
            }
            None => self.bind(id.clone(), Some(Concrete::Instance(instance)), shared),
        }
    }

    pub fn remove(&mut self, id: &ServiceId) -> Option<Binding> {
        self.bindings.remove(id)
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        let mut ids: Vec<ServiceId> = self.bindings.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
