//! Provider registry for cluster provisioning tests.
//!
//! Given an infrastructure provider name, the crate returns the bundle of
//! factories used to provision machines on it: machine-pool resources and a
//! cloud credential for modern provisioning ([`ProvisioningRegistry`]), or a
//! node template for legacy RKE1 provisioning ([`LegacyRegistry`]). Factories
//! are configured from a provider inputs file and submit their requests
//! through an [`OrchestrationClient`].

pub mod capability;
pub mod client;
pub mod config;
pub mod inputs;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod resource;
pub mod roles;
pub mod test_support;

pub use capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
pub use client::{
    ClientError, ClientFuture, CloudCredential, CloudCredentialSpec, DryRunClient, NodeTemplate,
    NodeTemplateSpec, OrchestrationClient,
};
pub use config::{ConfigError, RegistryConfig};
pub use inputs::{InputsError, ProviderInputs};
pub use provider::{ProviderName, UnknownProviderName};
pub use registry::{
    LEGACY_PROVIDERS, LegacyBundle, LegacyRegistry, ProvisioningBundle, ProvisioningRegistry,
    RegistryError, RegistryKind,
};
pub use resource::{ResourceDescriptor, generate_pool_name};
pub use roles::{MachineRole, PoolRoles};
