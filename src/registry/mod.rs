//! Provider registries mapping a provider name to its factory bundle.
//!
//! [`ProvisioningRegistry`] serves modern provisioning and knows every
//! [`ProviderName`]. [`LegacyRegistry`] serves RKE1 node-template
//! provisioning and has no DigitalOcean entry. Both build a fresh bundle per
//! lookup from capability objects shared behind [`Arc`]s.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capability::{CloudCredentialProvider, MachinePoolBuilder, NodeTemplateProvider};
use crate::inputs::ProviderInputs;
use crate::provider::ProviderName;
use crate::providers::{
    AliyunProvider, AwsProvider, AzureProvider, DigitalOceanProvider, HarvesterProvider,
    LinodeProvider, VsphereProvider,
};
use crate::roles::PoolRoles;

/// Providers served by the legacy registry, in canonical order.
pub const LEGACY_PROVIDERS: [ProviderName; 6] = [
    ProviderName::Aws,
    ProviderName::Azure,
    ProviderName::Linode,
    ProviderName::Harvester,
    ProviderName::Vsphere,
    ProviderName::Aliyun,
];

/// Identifies which registry a lookup ran against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryKind {
    /// Modern provisioning (machine pools and cloud credentials).
    Provisioning,
    /// Legacy RKE1 provisioning (node templates).
    Legacy,
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisioning => f.write_str("provisioning"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// Errors raised by registry lookups.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    /// No entry matches the requested name.
    #[error("{registry} registry has no provider named '{name}'")]
    UnknownProvider {
        /// Name exactly as supplied by the caller.
        name: String,
        /// Registry the lookup ran against.
        registry: RegistryKind,
    },
}

impl RegistryError {
    fn unknown(name: &str, registry: RegistryKind) -> Self {
        warn!(%name, %registry, "provider lookup missed");
        Self::UnknownProvider {
            name: name.to_owned(),
            registry,
        }
    }
}

/// Factories and metadata for modern provisioning with one provider.
#[derive(Clone)]
pub struct ProvisioningBundle {
    /// Provider the bundle belongs to.
    pub name: ProviderName,
    /// Resource type of the provider's machine configs.
    pub resource_type: &'static str,
    /// Builds machine-config resources for the provider's pools.
    pub machine_pools: Arc<dyn MachinePoolBuilder>,
    /// Creates the provider's cloud credential.
    pub cloud_credentials: Arc<dyn CloudCredentialProvider>,
    /// Roles of each machine pool, never empty.
    pub roles: Vec<PoolRoles>,
}

impl fmt::Debug for ProvisioningBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningBundle")
            .field("name", &self.name)
            .field("resource_type", &self.resource_type)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Node-template factory for legacy provisioning with one provider.
#[derive(Clone)]
pub struct LegacyBundle {
    /// Provider the bundle belongs to.
    pub name: ProviderName,
    /// Creates the provider's node template.
    pub node_templates: Arc<dyn NodeTemplateProvider>,
}

impl fmt::Debug for LegacyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyBundle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry for modern provisioning. Every provider has an entry.
#[derive(Clone, Debug)]
pub struct ProvisioningRegistry {
    aws: Arc<AwsProvider>,
    azure: Arc<AzureProvider>,
    digitalocean: Arc<DigitalOceanProvider>,
    linode: Arc<LinodeProvider>,
    harvester: Arc<HarvesterProvider>,
    vsphere: Arc<VsphereProvider>,
    aliyun: Arc<AliyunProvider>,
}

impl ProvisioningRegistry {
    /// Builds the registry over `inputs`.
    #[must_use]
    pub fn new(inputs: &ProviderInputs) -> Self {
        Self {
            aws: Arc::new(AwsProvider::new(&inputs.aws)),
            azure: Arc::new(AzureProvider::new(&inputs.azure)),
            digitalocean: Arc::new(DigitalOceanProvider::new(&inputs.digitalocean)),
            linode: Arc::new(LinodeProvider::new(&inputs.linode)),
            harvester: Arc::new(HarvesterProvider::new(&inputs.harvester)),
            vsphere: Arc::new(VsphereProvider::new(&inputs.vsphere)),
            aliyun: Arc::new(AliyunProvider::new(&inputs.aliyun)),
        }
    }

    /// Providers with an entry, in canonical order.
    #[must_use]
    pub const fn supported(&self) -> &'static [ProviderName] {
        &ProviderName::ALL
    }

    /// Returns the bundle for `name`.
    #[must_use]
    pub fn resolve(&self, name: ProviderName) -> ProvisioningBundle {
        debug!(provider = %name, registry = %RegistryKind::Provisioning, "resolving provider");
        match name {
            ProviderName::Aws => bundle(name, &self.aws),
            ProviderName::Azure => bundle(name, &self.azure),
            ProviderName::DigitalOcean => bundle(name, &self.digitalocean),
            ProviderName::Linode => bundle(name, &self.linode),
            ProviderName::Harvester => bundle(name, &self.harvester),
            ProviderName::Vsphere => bundle(name, &self.vsphere),
            ProviderName::Aliyun => bundle(name, &self.aliyun),
        }
    }

    /// Parses `name` and returns its bundle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProvider`] when `name` is not a
    /// canonical provider name. Matching is case-sensitive.
    pub fn resolve_provider(&self, name: &str) -> Result<ProvisioningBundle, RegistryError> {
        let provider: ProviderName = name
            .parse()
            .map_err(|_| RegistryError::unknown(name, RegistryKind::Provisioning))?;
        Ok(self.resolve(provider))
    }
}

fn bundle<P>(name: ProviderName, provider: &Arc<P>) -> ProvisioningBundle
where
    P: MachinePoolBuilder + CloudCredentialProvider + 'static,
{
    ProvisioningBundle {
        name,
        resource_type: provider.resource_type(),
        roles: provider.roles(),
        machine_pools: Arc::clone(provider) as Arc<dyn MachinePoolBuilder>,
        cloud_credentials: Arc::clone(provider) as Arc<dyn CloudCredentialProvider>,
    }
}

/// Registry for legacy RKE1 provisioning.
#[derive(Clone, Debug)]
pub struct LegacyRegistry {
    aws: Arc<AwsProvider>,
    azure: Arc<AzureProvider>,
    linode: Arc<LinodeProvider>,
    harvester: Arc<HarvesterProvider>,
    vsphere: Arc<VsphereProvider>,
    aliyun: Arc<AliyunProvider>,
}

impl LegacyRegistry {
    /// Builds the registry over `inputs`. DigitalOcean inputs are ignored.
    #[must_use]
    pub fn new(inputs: &ProviderInputs) -> Self {
        Self {
            aws: Arc::new(AwsProvider::new(&inputs.aws)),
            azure: Arc::new(AzureProvider::new(&inputs.azure)),
            linode: Arc::new(LinodeProvider::new(&inputs.linode)),
            harvester: Arc::new(HarvesterProvider::new(&inputs.harvester)),
            vsphere: Arc::new(VsphereProvider::new(&inputs.vsphere)),
            aliyun: Arc::new(AliyunProvider::new(&inputs.aliyun)),
        }
    }

    /// Providers with an entry, in canonical order.
    #[must_use]
    pub const fn supported(&self) -> &'static [ProviderName] {
        &LEGACY_PROVIDERS
    }

    /// Reports whether `name` has an entry.
    #[must_use]
    pub fn supports(&self, name: ProviderName) -> bool {
        LEGACY_PROVIDERS.contains(&name)
    }

    /// Returns the bundle for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProvider`] for DigitalOcean.
    pub fn resolve(&self, name: ProviderName) -> Result<LegacyBundle, RegistryError> {
        debug!(provider = %name, registry = %RegistryKind::Legacy, "resolving provider");
        let node_templates: Arc<dyn NodeTemplateProvider> = match name {
            ProviderName::Aws => Arc::clone(&self.aws) as Arc<dyn NodeTemplateProvider>,
            ProviderName::Azure => Arc::clone(&self.azure) as Arc<dyn NodeTemplateProvider>,
            ProviderName::Linode => Arc::clone(&self.linode) as Arc<dyn NodeTemplateProvider>,
            ProviderName::Harvester => {
                Arc::clone(&self.harvester) as Arc<dyn NodeTemplateProvider>
            }
            ProviderName::Vsphere => Arc::clone(&self.vsphere) as Arc<dyn NodeTemplateProvider>,
            ProviderName::Aliyun => Arc::clone(&self.aliyun) as Arc<dyn NodeTemplateProvider>,
            ProviderName::DigitalOcean => {
                return Err(RegistryError::unknown(name.as_str(), RegistryKind::Legacy));
            }
        };
        Ok(LegacyBundle {
            name,
            node_templates,
        })
    }

    /// Parses `name` and returns its bundle.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownProvider`] when `name` is not a
    /// canonical provider name or names a provider without a legacy entry.
    pub fn resolve_rke1_provider(&self, name: &str) -> Result<LegacyBundle, RegistryError> {
        let provider: ProviderName = name
            .parse()
            .map_err(|_| RegistryError::unknown(name, RegistryKind::Legacy))?;
        self.resolve(provider)
    }
}
