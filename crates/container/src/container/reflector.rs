//! Constructor metadata for autowiring
//!
//! Rust has no runtime reflection of constructor signatures, so every type the
//! container may build describes itself: its constructor parameters, the types
//! it extends and a function that builds it from resolved [`Arguments`].
//! [`TypeCatalog`] is the lookup table the resolution engine reflects against.
//!
//! ```rust
//! use elif_container::container::{Arguments, ConstructorParam, Injectable, TypeCatalog};
//! use elif_container::ContainerError;
//! use std::sync::Arc;
//!
//! struct Clock;
//! impl Injectable for Clock {
//!     fn construct(_args: &Arguments) -> Result<Self, ContainerError> {
//!         Ok(Clock)
//!     }
//! }
//!
//! struct Scheduler {
//!     clock: Arc<Clock>,
//! }
//! impl Injectable for Scheduler {
//!     fn constructor() -> Vec<ConstructorParam> {
//!         vec![ConstructorParam::service::<Clock>("clock")]
//!     }
//!
//!     fn construct(args: &Arguments) -> Result<Self, ContainerError> {
//!         Ok(Scheduler { clock: args.service("clock")? })
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register::<Clock>();
//! catalog.register::<Scheduler>();
//! assert!(catalog.contains(&elif_container::ServiceId::of::<Scheduler>()));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::container::id::ServiceId;
use crate::container::instance::{Arguments, Instance};
use crate::error::{ContainerError, Result};

/// Builtin (non-service) parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinType {
    Bool,
    Int,
    Float,
    String,
    Array,
    Mixed,
}

/// Declared type of a constructor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// No declared type
    Untyped,
    Builtin(BuiltinType),
    /// A type the container resolves recursively
    Service(ServiceId),
    /// More than one alternative; never resolvable
    Union(Vec<ServiceId>),
}

/// Availability of a parameter's default value
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    None,
    Value(Value),
    /// Declared optional, but the value cannot be read
    Unreadable,
}

/// One reflected constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorParam {
    pub name: String,
    pub ty: ParamType,
    pub nullable: bool,
    pub default: DefaultValue,
}

impl ConstructorParam {
    fn with_type(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            default: DefaultValue::None,
        }
    }

    /// Dependency on another service type
    pub fn service<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::with_type(name, ParamType::Service(ServiceId::of::<T>()))
    }

    /// Dependency on a service registered under an arbitrary id
    pub fn service_id(name: impl Into<String>, id: impl Into<ServiceId>) -> Self {
        Self::with_type(name, ParamType::Service(id.into()))
    }

    pub fn builtin(name: impl Into<String>, ty: BuiltinType) -> Self {
        Self::with_type(name, ParamType::Builtin(ty))
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::with_type(name, ParamType::Untyped)
    }

    pub fn union<I>(name: impl Into<String>, alternatives: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ServiceId>,
    {
        Self::with_type(
            name,
            ParamType::Union(alternatives.into_iter().map(Into::into).collect()),
        )
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = DefaultValue::Value(value);
        self
    }

    pub fn with_unreadable_default(mut self) -> Self {
        self.default = DefaultValue::Unreadable;
        self
    }

    pub fn has_default(&self) -> bool {
        !matches!(self.default, DefaultValue::None)
    }
}

/// Trait for types the container can construct by autowiring
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters in declaration order
    fn constructor() -> Vec<ConstructorParam> {
        Vec::new()
    }

    /// Types this type directly extends
    fn extends() -> Vec<ServiceId> {
        Vec::new()
    }

    /// Build the value from arguments resolved against [`Injectable::constructor`]
    fn construct(args: &Arguments) -> Result<Self>;
}

/// Erased constructor stored in a [`TypeDescriptor`]
pub type Constructor = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

/// Reflected shape of a type
#[derive(Clone)]
pub struct TypeDescriptor {
    id: ServiceId,
    kind: TypeKind,
    params: Vec<ConstructorParam>,
    extends: Vec<ServiceId>,
    constructor: Option<Constructor>,
}

impl TypeDescriptor {
    pub fn concrete<F>(id: impl Into<ServiceId>, params: Vec<ConstructorParam>, constructor: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            kind: TypeKind::Concrete,
            params,
            extends: Vec::new(),
            constructor: Some(Arc::new(constructor)),
        }
    }

    pub fn of<T: Injectable>() -> Self {
        Self::concrete(ServiceId::of::<T>(), T::constructor(), |args| {
            T::construct(args).map(Instance::new)
        })
        .extending_all(T::extends())
    }

    pub fn abstract_type(id: impl Into<ServiceId>) -> Self {
        Self {
            id: id.into(),
            kind: TypeKind::Abstract,
            params: Vec::new(),
            extends: Vec::new(),
            constructor: None,
        }
    }

    pub fn interface(id: impl Into<ServiceId>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::abstract_type(id)
        }
    }

    pub fn extending(mut self, parent: impl Into<ServiceId>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn extending_all(mut self, parents: Vec<ServiceId>) -> Self {
        self.extends.extend(parents);
        self
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn params(&self) -> &[ConstructorParam] {
        &self.params
    }

    pub fn extends(&self) -> &[ServiceId] {
        &self.extends
    }

    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.constructor.is_some()
    }

    pub fn instantiate(&self, args: &Arguments) -> Result<Instance> {
        match &self.constructor {
            Some(constructor) if self.kind == TypeKind::Concrete => constructor(args),
            _ => Err(ContainerError::not_instantiable(self.id.as_str())),
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("extends", &self.extends)
            .finish()
    }
}

/// Registry of type descriptors, keyed by type name
#[derive(Debug, Default, Clone)]
pub struct TypeCatalog {
    types: HashMap<ServiceId, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Injectable>(&mut self) {
        self.register_descriptor(TypeDescriptor::of::<T>());
    }

    pub fn register_abstract<T: ?Sized + 'static>(&mut self, extends: Vec<ServiceId>) {
        self.register_descriptor(
            TypeDescriptor::abstract_type(ServiceId::of::<T>()).extending_all(extends),
        );
    }

    pub fn register_interface<T: ?Sized + 'static>(&mut self) {
        self.register_descriptor(TypeDescriptor::interface(ServiceId::of::<T>()));
    }

    /// Register or replace a descriptor
    pub fn register_descriptor(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.id.clone(), descriptor);
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.types.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Look a type up; unknown types are `ClassNotFound`
    pub fn reflect(&self, id: &ServiceId) -> Result<&TypeDescriptor> {
        self.types
            .get(id)
            .ok_or_else(|| ContainerError::class_not_found(id.as_str()))
    }

    /// Whether `child` is `parent` or extends it, directly or transitively
    pub fn is_subtype(&self, child: &ServiceId, parent: &ServiceId) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![child.clone()];

        while let Some(current) = pending.pop() {
            if &current == parent {
                return true;
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(descriptor) = self.types.get(&current) {
                pending.extend(descriptor.extends.iter().cloned());
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    trait Store: Send + Sync {}

    struct MemoryStore {
        capacity: u32,
    }

    impl Store for MemoryStore {}

    impl Injectable for MemoryStore {
        fn constructor() -> Vec<ConstructorParam> {
            vec![ConstructorParam::builtin("capacity", BuiltinType::Int).with_default(json!(64))]
        }

        fn extends() -> Vec<ServiceId> {
            vec![ServiceId::of::<dyn Store>()]
        }

        fn construct(args: &Arguments) -> Result<Self> {
            Ok(MemoryStore {
                capacity: args.value("capacity")?,
            })
        }
    }

    struct TieredStore;

    impl Injectable for TieredStore {
        fn extends() -> Vec<ServiceId> {
            vec![ServiceId::of::<MemoryStore>()]
        }

        fn construct(_args: &Arguments) -> Result<Self> {
            Ok(TieredStore)
        }
    }

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.register_interface::<dyn Store>();
        catalog.register::<MemoryStore>();
        catalog.register::<TieredStore>();
        catalog
    }

    #[test]
    fn test_reflect_reports_constructor() {
        let catalog = catalog();
        let descriptor = catalog.reflect(&ServiceId::of::<MemoryStore>()).unwrap();

        assert!(descriptor.is_instantiable());
        assert_eq!(descriptor.params().len(), 1);
        assert_eq!(descriptor.params()[0].ty, ParamType::Builtin(BuiltinType::Int));
        assert!(descriptor.params()[0].has_default());

        let instance = descriptor
            .instantiate(&Arguments::new(descriptor.id()).with_value("capacity", json!(8)))
            .unwrap();
        assert_eq!(instance.downcast::<MemoryStore>().unwrap().capacity, 8);
    }

    #[test]
    fn test_unknown_and_abstract_types() {
        let catalog = catalog();

        let err = catalog.reflect(&ServiceId::from("app::Missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClassNotFound);

        let store = catalog.reflect(&ServiceId::of::<dyn Store>()).unwrap();
        assert_eq!(store.kind(), TypeKind::Interface);
        assert!(!store.is_instantiable());
        let err = store.instantiate(&Arguments::new(store.id())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInstantiable);
    }

    #[test]
    fn test_subtype_walks_declared_parents() {
        let catalog = catalog();
        let store = ServiceId::of::<dyn Store>();
        let memory = ServiceId::of::<MemoryStore>();
        let tiered = ServiceId::of::<TieredStore>();

        assert!(catalog.is_subtype(&memory, &memory));
        assert!(catalog.is_subtype(&memory, &store));
        assert!(catalog.is_subtype(&tiered, &store));
        assert!(!catalog.is_subtype(&store, &memory));
        assert!(!catalog.is_subtype(&ServiceId::from("unknown"), &store));
    }

    #[test]
    fn test_subtype_survives_cyclic_declarations() {
        let mut catalog = TypeCatalog::new();
        catalog.register_descriptor(TypeDescriptor::abstract_type("a").extending("b"));
        catalog.register_descriptor(TypeDescriptor::abstract_type("b").extending("a"));

        assert!(!catalog.is_subtype(&ServiceId::from("a"), &ServiceId::from("c")));
        assert!(catalog.is_subtype(&ServiceId::from("a"), &ServiceId::from("b")));
    }

    #[test]
    fn test_param_builders() {
        let param = ConstructorParam::union("driver", ["redis", "memcached"]);
        assert_eq!(
            param.ty,
            ParamType::Union(vec![ServiceId::from("redis"), ServiceId::from("memcached")])
        );

        let param = ConstructorParam::untyped("anything").nullable();
        assert!(param.nullable);
        assert!(!param.has_default());

        let param = ConstructorParam::builtin("ttl", BuiltinType::Int).with_unreadable_default();
        assert_eq!(param.default, DefaultValue::Unreadable);
    }
}
