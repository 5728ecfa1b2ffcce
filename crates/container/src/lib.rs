pub mod config;
pub mod container;
pub mod error;
pub mod framework;
pub mod providers;

// Re-export key types for convenience
pub use config::{ConfigError, ConfigSource, ContainerConfig};
pub use container::{
    Arguments, BuiltinType, Concrete, ConstructorParam, Container, ContainerBuilder, Injectable,
    Instance, Parameters, Resolver, ServiceId, TypeCatalog, TypeDescriptor,
};
pub use error::{ContainerError, ErrorKind};
pub use framework::{ConfigRepository, LogManager};
pub use providers::{ProviderError, ProviderRegistry, ServiceProvider};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}
