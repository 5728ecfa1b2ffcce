use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::container::binding::Concrete;
use crate::container::container::Container;
use crate::container::id::ServiceId;
use crate::container::instance::{Argument, Arguments, Instance, Parameters};
use crate::container::reflector::{ConstructorParam, DefaultValue, ParamType, TypeDescriptor};
use crate::error::{ContainerError, Result};

/// One `make` call tree
///
/// Carries the stack of identifiers currently being built, so a dependency that
/// requires itself (directly, transitively, or through a factory) fails with
/// `CyclicDependency` instead of recursing without bound. Factories receive the
/// resolver and should resolve their own dependencies through it.
pub struct Resolver<'c> {
    container: &'c Container,
    stack: Vec<ServiceId>,
    /// Every identifier requested through this resolver
    requested: HashSet<ServiceId>,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            stack: Vec::new(),
            requested: HashSet::new(),
        }
    }

    pub fn container(&self) -> &'c Container {
        self.container
    }

    /// Identifiers currently being resolved, outermost first
    pub fn stack(&self) -> &[ServiceId] {
        &self.stack
    }

    pub fn make(&mut self, id: impl Into<ServiceId>) -> Result<Instance> {
        self.make_with(id, &Parameters::new())
    }

    pub fn make_as<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>> {
        self.make_typed(ServiceId::of::<T>())
    }

    pub fn make_typed<T: Send + Sync + 'static>(&mut self, id: impl Into<ServiceId>) -> Result<Arc<T>> {
        let id = id.into();
        let instance = self.make(id.clone())?;
        downcast(&id, instance)
    }

    pub fn make_with(&mut self, id: impl Into<ServiceId>, params: &Parameters) -> Result<Instance> {
        let requested = id.into();
        let id = self.container.canonical_id(&requested)?;
        if id != requested {
            tracing::trace!("[{}] resolves through [{}]", requested, id);
        }
        self.requested.insert(requested);
        self.requested.insert(id.clone());

        if let Some(instance) = self.container.cached_instance(&id)? {
            return Ok(instance);
        }

        self.enter(&id)?;
        let result = self.resolve(&id, params);
        self.stack.pop();
        result
    }

    fn enter(&mut self, id: &ServiceId) -> Result<()> {
        if let Some(start) = self.stack.iter().position(|entry| entry == id) {
            let path = self.stack[start..]
                .iter()
                .chain(std::iter::once(id))
                .map(ServiceId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ContainerError::CyclicDependency {
                path,
                service: id.to_string(),
            });
        }

        let limit = self.container.config().max_resolution_depth;
        if self.stack.len() >= limit {
            return Err(ContainerError::resolution_failed(
                id.as_str(),
                format!("maximum resolution depth of {} exceeded", limit),
            ));
        }

        self.stack.push(id.clone());
        Ok(())
    }

    fn resolve(&mut self, id: &ServiceId, params: &Parameters) -> Result<Instance> {
        let binding = self.container.binding(id)?;
        let shared = binding.as_ref().map(|b| b.shared).unwrap_or(false);
        let concrete = binding.and_then(|b| b.concrete);

        let type_name = match concrete {
            Some(Concrete::Factory(factory)) => {
                tracing::debug!("Resolving [{}] through its factory", id);
                let instance = factory(self, params)?;
                self.check_reserved_instance(id, &instance)?;
                return self.store(id, instance, shared);
            }
            Some(Concrete::Instance(instance)) => {
                self.check_reserved_instance(id, &instance)?;
                return self.store(id, instance, shared);
            }
            Some(Concrete::Type(type_name)) => Some(type_name),
            None => None,
        };

        if let Some(parent) = self.container.reserved().parent_of(id).cloned() {
            return self.resolve_reserved(id, &parent, type_name, params);
        }

        let type_name = type_name.unwrap_or_else(|| id.clone());
        tracing::debug!("Autowiring [{}] as [{}]", id, type_name);
        let instance = self.build(&type_name, params)?;
        self.store(id, instance, shared)
    }

    fn resolve_reserved(
        &mut self,
        id: &ServiceId,
        parent: &ServiceId,
        concrete: Option<ServiceId>,
        params: &Parameters,
    ) -> Result<Instance> {
        let target = match concrete {
            None => parent.clone(),
            Some(concrete) => {
                self.container.reflect(&concrete)?;
                if !self.container.is_subtype(&concrete, parent)? {
                    tracing::warn!(
                        "Rejected override [{}] for reserved service [{}]: it does not extend [{}]",
                        concrete,
                        id,
                        parent
                    );
                    return Err(ContainerError::reserved_mismatch(
                        id.as_str(),
                        concrete.as_str(),
                        parent.as_str(),
                    ));
                }
                concrete
            }
        };

        tracing::debug!("Resolving reserved service [{}] as [{}]", id, target);
        let instance = self.build(&target, params)?;
        self.store(id, instance, true)
    }

    /// Store through the container
    ///
    /// A value whose runtime type was itself requested in this call tree came
    /// from that type's own resolution, so it gets no runtime-type alias.
    fn store(&self, id: &ServiceId, instance: Instance, shared: bool) -> Result<Instance> {
        let alias_runtime = !self.requested.contains(&instance.type_id());
        self.container.store_instance(id, instance, shared, alias_runtime)
    }

    fn check_reserved_instance(&self, id: &ServiceId, instance: &Instance) -> Result<()> {
        if !self.container.config().strict_reserved {
            return Ok(());
        }
        let Some(parent) = self.container.reserved().parent_of(id) else {
            return Ok(());
        };

        if self.container.is_subtype(&instance.type_id(), parent)? {
            Ok(())
        } else {
            Err(ContainerError::reserved_mismatch(
                id.as_str(),
                instance.type_name(),
                parent.as_str(),
            ))
        }
    }

    /// Reflect `type_name` and construct it, resolving each constructor parameter
    fn build(&mut self, type_name: &ServiceId, params: &Parameters) -> Result<Instance> {
        let descriptor = self.container.reflect(type_name)?;
        if !descriptor.is_instantiable() {
            return Err(ContainerError::not_instantiable(type_name.as_str()));
        }

        if descriptor.params().is_empty() {
            return descriptor.instantiate(&Arguments::new(type_name));
        }

        let nested = self.stack.last() != Some(type_name);
        if nested {
            self.enter(type_name)?;
        }

        let result = self.build_with(type_name, &descriptor, params);

        if nested {
            self.stack.pop();
        }
        result
    }

    fn build_with(
        &mut self,
        type_name: &ServiceId,
        descriptor: &TypeDescriptor,
        params: &Parameters,
    ) -> Result<Instance> {
        let mut args = Arguments::new(type_name);
        for param in descriptor.params() {
            let argument = self.resolve_param(type_name, param, params)?;
            args.push(param.name.as_str(), argument);
        }
        descriptor.instantiate(&args)
    }

    fn resolve_param(
        &mut self,
        owner: &ServiceId,
        param: &ConstructorParam,
        params: &Parameters,
    ) -> Result<Argument> {
        tracing::trace!("Resolving parameter '{}' of [{}]", param.name, owner);

        match &param.ty {
            ParamType::Untyped => Err(ContainerError::missing_type_hint(owner.as_str(), &param.name)),
            ParamType::Union(_) => Err(ContainerError::union_type(owner.as_str(), &param.name)),
            ParamType::Service(dependency) => {
                self.make(dependency.clone()).map(Argument::Service)
            }
            ParamType::Builtin(_) => {
                if let Some(value) = params.get(&param.name) {
                    return Ok(Argument::Value(value.clone()));
                }
                if param.nullable {
                    return Ok(Argument::Value(Value::Null));
                }
                match &param.default {
                    DefaultValue::Value(value) => Ok(Argument::Value(value.clone())),
                    DefaultValue::Unreadable => Err(ContainerError::unresolvable_default(
                        owner.as_str(),
                        &param.name,
                    )),
                    DefaultValue::None => {
                        Err(ContainerError::invalid_param(owner.as_str(), &param.name))
                    }
                }
            }
        }
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(id: &ServiceId, instance: Instance) -> Result<Arc<T>> {
    instance.downcast::<T>().ok_or_else(|| {
        ContainerError::resolution_failed(
            id.as_str(),
            format!(
                "resolved instance is [{}], not [{}]",
                instance.type_name(),
                std::any::type_name::<T>()
            ),
        )
    })
}
