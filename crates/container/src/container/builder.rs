use crate::config::ContainerConfig;
use crate::container::container::Container;
use crate::container::id::ServiceId;
use crate::container::reflector::{Injectable, TypeCatalog, TypeDescriptor};
use crate::container::reserved::ReservedServices;
use crate::error::Result;

/// Builder for containers that need a non-default configuration, a pre-filled
/// type catalog or extra reserved services
///
/// The reserved-service table is fixed once the container is built.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    config: ContainerConfig,
    catalog: TypeCatalog,
    reserved: ReservedServices,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from `ELIF_CONTAINER_*` environment variables
    pub fn with_env_config(self) -> Result<Self> {
        Ok(self.with_config(ContainerConfig::from_env()?))
    }

    pub fn register<T: Injectable>(mut self) -> Self {
        self.catalog.register::<T>();
        self
    }

    pub fn register_descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.catalog.register_descriptor(descriptor);
        self
    }

    /// Reserve `id`: overrides must be `parent` or extend it
    pub fn reserve(mut self, id: impl Into<ServiceId>, parent: impl Into<ServiceId>) -> Self {
        self.reserved.reserve(id, parent);
        self
    }

    pub fn build(self) -> Result<Container> {
        self.config.validate()?;
        tracing::debug!(
            "Building container with {} known types and {} reserved services",
            self.catalog.len(),
            self.reserved.len()
        );
        Ok(Container::from_parts(self.config, self.catalog, self.reserved))
    }
}
