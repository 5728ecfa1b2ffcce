use crate::config::ConfigError;
use crate::providers::ProviderError;
use thiserror::Error;

/// Error type for every container operation
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Target class [{service}] does not exist")]
    ClassNotFound { service: String },

    #[error("Target [{service}] is not instantiable")]
    NotInstantiable { service: String },

    #[error("Parameter '{parameter}' of [{service}] has no type hint")]
    MissingTypeHint { service: String, parameter: String },

    #[error("Parameter '{parameter}' of [{service}] declares a union type, which cannot be resolved")]
    UnionTypeUnsupported { service: String, parameter: String },

    #[error("Default value of parameter '{parameter}' of [{service}] cannot be read")]
    UnresolvableDefault { service: String, parameter: String },

    #[error("Unresolvable parameter '{parameter}' of [{service}]: not nullable, no default and not a service")]
    InvalidParam { service: String, parameter: String },

    #[error("Reserved service [{service}] must be [{parent}] or extend it, got [{concrete}]")]
    ReservedServiceMismatch {
        service: String,
        concrete: String,
        parent: String,
    },

    #[error("[{service}] is aliased to itself")]
    SelfAlias { service: String },

    #[error("Circular dependency detected: {path} (cycle at: {service})")]
    CyclicDependency { path: String, service: String },

    #[error("Argument '{parameter}' is not a {expected}")]
    ArgumentMismatch { parameter: String, expected: String },

    #[error("Resolution of [{service}] failed: {message}")]
    ResolutionFailed { service: String, message: String },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Discriminant of a [`ContainerError`], for callers that branch on the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ClassNotFound,
    NotInstantiable,
    MissingTypeHint,
    UnionTypeUnsupported,
    UnresolvableDefault,
    InvalidParam,
    ReservedServiceMismatch,
    SelfAlias,
    CyclicDependency,
    ArgumentMismatch,
    ResolutionFailed,
    LockError,
    Configuration,
    Provider,
}

impl ContainerError {
    pub fn class_not_found(service: impl Into<String>) -> Self {
        Self::ClassNotFound {
            service: service.into(),
        }
    }

    pub fn not_instantiable(service: impl Into<String>) -> Self {
        Self::NotInstantiable {
            service: service.into(),
        }
    }

    pub fn missing_type_hint(service: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingTypeHint {
            service: service.into(),
            parameter: parameter.into(),
        }
    }

    pub fn union_type(service: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::UnionTypeUnsupported {
            service: service.into(),
            parameter: parameter.into(),
        }
    }

    pub fn unresolvable_default(service: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::UnresolvableDefault {
            service: service.into(),
            parameter: parameter.into(),
        }
    }

    pub fn invalid_param(service: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::InvalidParam {
            service: service.into(),
            parameter: parameter.into(),
        }
    }

    pub fn reserved_mismatch(
        service: impl Into<String>,
        concrete: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self::ReservedServiceMismatch {
            service: service.into(),
            concrete: concrete.into(),
            parent: parent.into(),
        }
    }

    pub fn self_alias(service: impl Into<String>) -> Self {
        Self::SelfAlias {
            service: service.into(),
        }
    }

    pub fn argument_mismatch(parameter: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            parameter: parameter.into(),
            expected: expected.into(),
        }
    }

    /// Failure raised by user code (factories, constructors) while building a service
    pub fn resolution_failed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn lock(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClassNotFound { .. } => ErrorKind::ClassNotFound,
            Self::NotInstantiable { .. } => ErrorKind::NotInstantiable,
            Self::MissingTypeHint { .. } => ErrorKind::MissingTypeHint,
            Self::UnionTypeUnsupported { .. } => ErrorKind::UnionTypeUnsupported,
            Self::UnresolvableDefault { .. } => ErrorKind::UnresolvableDefault,
            Self::InvalidParam { .. } => ErrorKind::InvalidParam,
            Self::ReservedServiceMismatch { .. } => ErrorKind::ReservedServiceMismatch,
            Self::SelfAlias { .. } => ErrorKind::SelfAlias,
            Self::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            Self::ArgumentMismatch { .. } => ErrorKind::ArgumentMismatch,
            Self::ResolutionFailed { .. } => ErrorKind::ResolutionFailed,
            Self::LockError { .. } => ErrorKind::LockError,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Provider(_) => ErrorKind::Provider,
        }
    }

    /// Check whether the error is of the given kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == kind
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;
