#[allow(clippy::module_inception)]
pub mod container;
pub mod builder;
pub mod id;
pub mod instance;
pub mod binding;
pub mod alias;
pub mod reserved;
pub mod reflector;
pub mod cache;
pub mod resolver;

pub use container::Container;
pub use builder::ContainerBuilder;
pub use id::ServiceId;
pub use instance::{Argument, Arguments, Instance, Parameters};
pub use binding::{Binding, BindingRegistry, Concrete, Factory};
pub use alias::AliasTable;
pub use reserved::ReservedServices;
pub use reflector::{
    BuiltinType, ConstructorParam, DefaultValue, Injectable, ParamType, TypeCatalog,
    TypeDescriptor, TypeKind,
};
pub use cache::InstanceCache;
pub use resolver::Resolver;
