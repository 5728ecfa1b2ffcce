pub mod provider;
pub mod registry;

pub use provider::{ProviderError, ProviderMetadata, ServiceProvider};
pub use registry::ProviderRegistry;
