//! DigitalOcean droplet configs and credentials.
//!
//! Legacy (RKE1) provisioning has no DigitalOcean node template, so this
//! provider only implements the machine-pool and credential capabilities.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder,
};
use crate::client::{CloudCredential, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for DigitalOcean pools.
pub const DIGITALOCEAN_POOL_TYPE: &str = "rke-machine-config.cattle.io.digitaloceanconfig";
const MACHINE_CONFIG_KIND: &str = "DigitaloceanConfig";
const CREDENTIAL_CONFIG_KEY: &str = "digitaloceancredentialConfig";

/// DigitalOcean API token.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DigitalOceanCredentials {
    /// Personal access token.
    pub access_token: String,
}

/// Droplet settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DigitalOceanMachineConfig {
    /// Droplet image slug.
    pub image: String,
    /// Datacenter region slug.
    pub region: String,
    /// Droplet size slug.
    pub size: String,
    /// Login user.
    pub ssh_user: String,
    /// SSH port.
    pub ssh_port: String,
    /// Enable the monitoring agent.
    pub monitoring: bool,
    /// Attach the droplet to the VPC network.
    pub private_networking: bool,
    /// Comma separated droplet tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl Default for DigitalOceanMachineConfig {
    fn default() -> Self {
        Self {
            image: String::from("ubuntu-22-04-x64"),
            region: String::from("nyc3"),
            size: String::from("s-2vcpu-4gb"),
            ssh_user: String::from("root"),
            ssh_port: String::from("22"),
            monitoring: false,
            private_networking: false,
            tags: None,
        }
    }
}

/// Inputs for the DigitalOcean provider. `nodeTemplate` is rejected at
/// validation time.
pub type DigitalOceanSection = ProviderSection<DigitalOceanCredentials, DigitalOceanMachineConfig>;

/// DigitalOcean implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct DigitalOceanProvider {
    section: DigitalOceanSection,
}

impl DigitalOceanProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &DigitalOceanSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for DigitalOceanProvider {
    fn resource_type(&self) -> &'static str {
        DIGITALOCEAN_POOL_TYPE
    }

    fn roles(&self) -> Vec<PoolRoles> {
        self.section.pool_roles()
    }

    fn build(
        &self,
        pool_name: &str,
        namespace: &str,
    ) -> Result<Vec<ResourceDescriptor>, FactoryError> {
        self.section.descriptors(
            ProviderName::DigitalOcean,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for DigitalOceanProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::DigitalOcean,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}
