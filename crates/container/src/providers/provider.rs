use crate::container::Container;
use crate::error::ContainerError;

/// Provider error type
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Circular dependency detected in provider: {provider}")]
    CircularDependency { provider: String },

    #[error("Missing dependency '{dependency}' for provider '{provider}'")]
    MissingDependency {
        provider: String,
        dependency: String,
    },

    #[error("Provider '{provider}' failed to register: {source}")]
    RegistrationFailed {
        provider: String,
        source: Box<ContainerError>,
    },

    #[error("Provider '{provider}' failed to boot: {source}")]
    BootFailed {
        provider: String,
        source: Box<ContainerError>,
    },
}

/// Registers bindings with a container and boots once every provider is registered
///
/// Providers are how the rest of the framework (kernels, managers, facades)
/// talks to the container: `register` only binds, `boot` may resolve.
pub trait ServiceProvider: Send + Sync {
    /// Provider name for identification and dependency resolution
    fn name(&self) -> &'static str;

    fn register(&self, container: &Container) -> Result<(), ContainerError>;

    fn boot(&self, container: &Container) -> Result<(), ContainerError> {
        let _ = container;
        Ok(())
    }

    /// Providers that must be registered and booted first
    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}

/// Provider metadata for introspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl ProviderMetadata {
    pub fn from_provider<P: ServiceProvider + ?Sized>(provider: &P) -> Self {
        Self {
            name: provider.name().to_string(),
            dependencies: provider
                .dependencies()
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}
