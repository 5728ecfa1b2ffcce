use std::collections::HashMap;

use crate::container::Container;
use crate::providers::{ProviderError, ProviderMetadata, ServiceProvider};

/// Orders service providers by their declared dependencies and runs their phases
pub struct ProviderRegistry {
    providers: Vec<Box<dyn ServiceProvider>>,
    order: Vec<usize>,
    metadata_cache: HashMap<String, ProviderMetadata>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            order: Vec::new(),
            metadata_cache: HashMap::new(),
        }
    }

    /// Register a service provider
    pub fn register<P: ServiceProvider + 'static>(&mut self, provider: P) {
        let metadata = ProviderMetadata::from_provider(&provider);
        self.metadata_cache.insert(metadata.name.clone(), metadata);
        self.providers.push(Box::new(provider));
        self.order.clear();
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn get_metadata(&self, name: &str) -> Option<&ProviderMetadata> {
        self.metadata_cache.get(name)
    }

    /// Provider names in execution order; empty until dependencies are resolved
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.order.iter().map(|&i| self.providers[i].name()).collect()
    }

    /// Resolve provider dependencies and determine execution order
    pub fn resolve_dependencies(&mut self) -> Result<(), ProviderError> {
        let name_to_index: HashMap<&'static str, usize> = self
            .providers
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name(), i))
            .collect();

        let count = self.providers.len();
        let mut visited = vec![false; count];
        let mut temp_mark = vec![false; count];
        let mut order = Vec::with_capacity(count);

        for index in 0..count {
            if !visited[index] {
                self.visit(index, &name_to_index, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        self.order = order;
        Ok(())
    }

    fn visit(
        &self,
        index: usize,
        name_to_index: &HashMap<&'static str, usize>,
        visited: &mut [bool],
        temp_mark: &mut [bool],
        order: &mut Vec<usize>,
    ) -> Result<(), ProviderError> {
        if temp_mark[index] {
            return Err(ProviderError::CircularDependency {
                provider: self.providers[index].name().to_string(),
            });
        }

        if visited[index] {
            return Ok(());
        }

        temp_mark[index] = true;

        for dependency in self.providers[index].dependencies() {
            match name_to_index.get(dependency) {
                Some(&dep_index) => {
                    self.visit(dep_index, name_to_index, visited, temp_mark, order)?
                }
                None => {
                    return Err(ProviderError::MissingDependency {
                        provider: self.providers[index].name().to_string(),
                        dependency: dependency.to_string(),
                    })
                }
            }
        }

        temp_mark[index] = false;
        visited[index] = true;
        order.push(index);

        Ok(())
    }

    /// Run every provider's register phase
    pub fn register_all(&self, container: &Container) -> Result<(), ProviderError> {
        for &index in &self.order {
            let provider = &self.providers[index];
            tracing::info!("Registering provider: {}", provider.name());
            provider
                .register(container)
                .map_err(|e| ProviderError::RegistrationFailed {
                    provider: provider.name().to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    /// Boot all providers after every one of them has registered
    pub fn boot_all(&self, container: &Container) -> Result<(), ProviderError> {
        for &index in &self.order {
            let provider = &self.providers[index];
            tracing::info!("Booting provider: {}", provider.name());
            provider
                .boot(container)
                .map_err(|e| ProviderError::BootFailed {
                    provider: provider.name().to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    /// Resolve ordering, then register and boot every provider
    pub fn bootstrap(&mut self, container: &Container) -> Result<(), ProviderError> {
        self.resolve_dependencies()?;
        self.register_all(container)?;
        self.boot_all(container)?;
        tracing::info!("Bootstrapped {} providers", self.providers.len());
        Ok(())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
