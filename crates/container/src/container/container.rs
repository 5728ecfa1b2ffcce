use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::ContainerConfig;
use crate::container::alias::AliasTable;
use crate::container::binding::{Binding, BindingRegistry, Concrete};
use crate::container::builder::ContainerBuilder;
use crate::container::cache::InstanceCache;
use crate::container::id::ServiceId;
use crate::container::instance::{Instance, Parameters};
use crate::container::reflector::{Injectable, TypeCatalog, TypeDescriptor};
use crate::container::reserved::ReservedServices;
use crate::container::resolver::{self, Resolver};
use crate::error::{ContainerError, Result};
use crate::framework;

/// Service container
///
/// Resolves abstract identifiers into instances: factory bindings, fixed
/// instances, reserved framework services and autowired types. Every lookup
/// structure sits behind its own lock and no lock is held while user code
/// (factories, constructors) runs, so one container can be shared across
/// threads. Shared instances live as long as the container.
#[derive(Debug)]
pub struct Container {
    bindings: RwLock<BindingRegistry>,
    aliases: RwLock<AliasTable>,
    instances: RwLock<InstanceCache>,
    catalog: RwLock<TypeCatalog>,
    reserved: ReservedServices,
    config: ContainerConfig,
}

impl Container {
    /// Create a container with the default configuration
    pub fn new() -> Self {
        Self::from_parts(ContainerConfig::default(), TypeCatalog::new(), ReservedServices::new())
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: ContainerConfig,
        mut catalog: TypeCatalog,
        mut reserved: ReservedServices,
    ) -> Self {
        if config.framework_services {
            framework::install(&mut catalog, &mut reserved);
        }

        Self {
            bindings: RwLock::new(BindingRegistry::new()),
            aliases: RwLock::new(AliasTable::new()),
            instances: RwLock::new(InstanceCache::new()),
            catalog: RwLock::new(catalog),
            reserved,
            config,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn reserved(&self) -> &ReservedServices {
        &self.reserved
    }

    /// Make `T` known to the autowiring engine
    pub fn register<T: Injectable>(&self) -> Result<()> {
        self.register_descriptor(TypeDescriptor::of::<T>())
    }

    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> Result<()> {
        write(&self.catalog, "type_catalog")?.register_descriptor(descriptor);
        Ok(())
    }

    pub fn register_interface<T: ?Sized + 'static>(&self) -> Result<()> {
        self.register_descriptor(TypeDescriptor::interface(ServiceId::of::<T>()))
    }

    pub fn register_abstract<T: ?Sized + 'static>(&self, extends: Vec<ServiceId>) -> Result<()> {
        self.register_descriptor(
            TypeDescriptor::abstract_type(ServiceId::of::<T>()).extending_all(extends),
        )
    }

    /// Register a binding, replacing any previous one
    ///
    /// With no concrete, `id` itself names the type to build. Nothing is
    /// validated until the binding is resolved.
    pub fn bind(
        &self,
        id: impl Into<ServiceId>,
        concrete: Option<Concrete>,
        shared: bool,
    ) -> Result<()> {
        let id = id.into();
        tracing::debug!("Binding [{}] (shared: {}): {:?}", id, shared, concrete);

        write(&self.bindings, "bindings")?.bind(id.clone(), concrete, shared);
        self.drop_stale(&id)
    }

    /// Register a binding unless `id` is already bound
    pub fn bind_if(
        &self,
        id: impl Into<ServiceId>,
        concrete: Option<Concrete>,
        shared: bool,
    ) -> Result<()> {
        let id = id.into();
        if self.bound(&id) {
            return Ok(());
        }
        self.bind(id, concrete, shared)
    }

    pub fn singleton(&self, id: impl Into<ServiceId>, concrete: Option<Concrete>) -> Result<()> {
        self.bind(id, concrete, true)
    }

    pub fn singleton_if(&self, id: impl Into<ServiceId>, concrete: Option<Concrete>) -> Result<()> {
        self.bind_if(id, concrete, true)
    }

    /// Bind a transient factory
    pub fn bind_factory<F>(&self, id: impl Into<ServiceId>, factory: F) -> Result<()>
    where
        F: Fn(&mut Resolver<'_>, &Parameters) -> Result<Instance> + Send + Sync + 'static,
    {
        self.bind(id, Some(Concrete::factory(factory)), false)
    }

    /// Bind a factory whose first result is kept
    pub fn singleton_factory<F>(&self, id: impl Into<ServiceId>, factory: F) -> Result<()>
    where
        F: Fn(&mut Resolver<'_>, &Parameters) -> Result<Instance> + Send + Sync + 'static,
    {
        self.bind(id, Some(Concrete::factory(factory)), true)
    }

    /// Bind abstract type `A` to concrete type `C`
    pub fn bind_type<A: ?Sized + 'static, C: ?Sized + 'static>(&self, shared: bool) -> Result<()> {
        self.bind(ServiceId::of::<A>(), Some(Concrete::of::<C>()), shared)
    }

    /// Register an already constructed value as a resolved shared service
    pub fn instance(&self, id: impl Into<ServiceId>, instance: Instance) -> Result<Instance> {
        let id = id.into();
        self.bind(id.clone(), Some(Concrete::Instance(instance.clone())), true)?;
        Ok(write(&self.instances, "instances")?.insert_if_absent(id, instance))
    }

    /// Register `alias` as another name for `id`
    pub fn alias(&self, id: impl Into<ServiceId>, alias: impl Into<ServiceId>) -> Result<()> {
        let id = id.into();
        let alias = alias.into();
        tracing::debug!("Aliasing [{}] to [{}]", alias, id);
        write(&self.aliases, "aliases")?.alias(id, alias)
    }

    /// Whether `id` has a binding of its own (aliases do not count)
    ///
    /// Boolean queries answer `false` on a poisoned lock and log a warning;
    /// the fallible operations return `LockError`.
    pub fn bound(&self, id: impl Into<ServiceId>) -> bool {
        let id = id.into();
        query(&self.bindings, "bindings")
            .map(|bindings| bindings.contains(&id))
            .unwrap_or(false)
    }

    /// Whether `id` is a shared service that has been constructed
    pub fn resolved(&self, id: impl Into<ServiceId>) -> bool {
        let id = match self.canonical_id(&id.into()) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("Treating service as unresolved: {}", err);
                return false;
            }
        };
        query(&self.instances, "instances")
            .map(|instances| instances.is_resolved(&id))
            .unwrap_or(false)
    }

    /// Bound, aliased or resolved
    pub fn has(&self, id: impl Into<ServiceId>) -> bool {
        let id = id.into();
        self.bound(&id) || self.is_alias(&id) || self.resolved(&id)
    }

    pub fn is_shared(&self, id: impl Into<ServiceId>) -> bool {
        let id = id.into();
        query(&self.bindings, "bindings")
            .map(|bindings| bindings.is_shared(&id))
            .unwrap_or(false)
    }

    pub fn is_alias(&self, id: impl Into<ServiceId>) -> bool {
        let id = id.into();
        query(&self.aliases, "aliases")
            .map(|aliases| aliases.is_alias(&id))
            .unwrap_or(false)
    }

    /// Target of `alias`, one hop
    pub fn get_alias(&self, alias: impl Into<ServiceId>) -> Option<ServiceId> {
        let alias = alias.into();
        query(&self.aliases, "aliases").and_then(|aliases| aliases.get(&alias).cloned())
    }

    /// Snapshot of every bound identifier
    pub fn bound_ids(&self) -> Result<Vec<ServiceId>> {
        Ok(read(&self.bindings, "bindings")?.ids())
    }

    /// Resolve `id`
    pub fn make(&self, id: impl Into<ServiceId>) -> Result<Instance> {
        Resolver::new(self).make(id)
    }

    /// Resolve `id`, handing `params` to its factory or constructor
    pub fn make_with(&self, id: impl Into<ServiceId>, params: &Parameters) -> Result<Instance> {
        Resolver::new(self).make_with(id, params)
    }

    /// Resolve the service registered under `T`'s own type name
    pub fn make_as<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.make_typed(ServiceId::of::<T>())
    }

    /// Resolve `id` and downcast it to `T`
    pub fn make_typed<T: Send + Sync + 'static>(&self, id: impl Into<ServiceId>) -> Result<Arc<T>> {
        let id = id.into();
        let instance = self.make(id.clone())?;
        resolver::downcast(&id, instance)
    }

    /// Drop the cached instance for `id`; the next `make` builds a new one
    pub fn forget_instance(&self, id: impl Into<ServiceId>) -> Result<()> {
        let id = self.canonical_id(&id.into())?;
        write(&self.instances, "instances")?.forget(&id);
        Ok(())
    }

    pub fn forget_instances(&self) -> Result<()> {
        write(&self.instances, "instances")?.clear();
        Ok(())
    }

    /// Remove every binding, alias and cached instance
    pub fn flush(&self) -> Result<()> {
        write(&self.bindings, "bindings")?.clear();
        write(&self.aliases, "aliases")?.clear();
        write(&self.instances, "instances")?.clear();
        Ok(())
    }

    /// Rebinding invalidates the cached instance and an alias of the same name
    fn drop_stale(&self, id: &ServiceId) -> Result<()> {
        write(&self.instances, "instances")?.forget(id);
        write(&self.aliases, "aliases")?.remove(id);
        Ok(())
    }

    /// Single alias hop, then reserved-service canonicalisation
    pub(crate) fn canonical_id(&self, id: &ServiceId) -> Result<ServiceId> {
        let id = read(&self.aliases, "aliases")?.resolve(id);
        Ok(self.reserved.canonical(&id).cloned().unwrap_or(id))
    }

    pub(crate) fn cached_instance(&self, id: &ServiceId) -> Result<Option<Instance>> {
        Ok(read(&self.instances, "instances")?.get(id).cloned())
    }

    pub(crate) fn binding(&self, id: &ServiceId) -> Result<Option<Binding>> {
        Ok(read(&self.bindings, "bindings")?.get(id).cloned())
    }

    pub(crate) fn reflect(&self, id: &ServiceId) -> Result<TypeDescriptor> {
        read(&self.catalog, "type_catalog")?.reflect(id).cloned()
    }

    pub(crate) fn is_subtype(&self, child: &ServiceId, parent: &ServiceId) -> Result<bool> {
        Ok(read(&self.catalog, "type_catalog")?.is_subtype(child, parent))
    }

    /// Record a constructed value
    ///
    /// Shared instances become the binding's concrete and are marked resolved;
    /// if another thread stored one first, that instance is returned instead.
    /// `alias_runtime` allows the runtime-type alias when `auto_alias` is on.
    pub(crate) fn store_instance(
        &self,
        id: &ServiceId,
        instance: Instance,
        shared: bool,
        alias_runtime: bool,
    ) -> Result<Instance> {
        let instance = if shared {
            let kept = write(&self.instances, "instances")?.insert_if_absent(id.clone(), instance);
            write(&self.bindings, "bindings")?.store_instance(id, kept.clone(), true);
            kept
        } else {
            instance
        };

        if self.config.auto_alias && alias_runtime {
            self.alias_runtime_type(id, &instance)?;
        }

        Ok(instance)
    }

    /// Only fills a free name: explicit aliases and bindings are never replaced
    fn alias_runtime_type(&self, id: &ServiceId, instance: &Instance) -> Result<()> {
        let runtime = instance.type_id();
        if &runtime == id || self.bound(&runtime) {
            return Ok(());
        }

        let mut aliases = write(&self.aliases, "aliases")?;
        if aliases.get(&runtime).is_none() {
            tracing::trace!("Aliasing runtime type [{}] to [{}]", runtime, id);
            aliases.alias(id.clone(), runtime)?;
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, resource: &str) -> Result<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| ContainerError::lock(resource))
}

fn write<'a, T>(lock: &'a RwLock<T>, resource: &str) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| ContainerError::lock(resource))
}

/// Read guard for boolean queries, `None` when the lock is poisoned
fn query<'a, T>(lock: &'a RwLock<T>, resource: &str) -> Option<RwLockReadGuard<'a, T>> {
    match lock.read() {
        Ok(guard) => Some(guard),
        Err(_) => {
            tracing::warn!("Lock on {} is poisoned, answering query as empty", resource);
            None
        }
    }
}
