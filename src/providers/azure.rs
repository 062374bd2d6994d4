//! Azure virtual machine configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for Azure pools.
pub const AZURE_POOL_TYPE: &str = "rke-machine-config.cattle.io.azureconfig";
const MACHINE_CONFIG_KIND: &str = "AzureConfig";
const CREDENTIAL_CONFIG_KEY: &str = "azurecredentialConfig";
const NODE_DRIVER: &str = "azure";
const NODE_TEMPLATE_CONFIG_KEY: &str = "azureConfig";

/// Service principal used to manage Azure resources.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureCredentials {
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Subscription the machines are billed to.
    pub subscription_id: String,
    /// Directory (tenant) id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Cloud environment, for example `AzurePublicCloud`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Azure virtual machine settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AzureMachineConfig {
    /// Cloud environment.
    pub environment: String,
    /// Azure location.
    pub location: String,
    /// Marketplace image URN.
    pub image: String,
    /// Virtual machine size.
    pub size: String,
    /// OS disk size in GiB.
    pub disk_size: String,
    /// Use managed disks.
    pub managed_disks: bool,
    /// Resource group holding the machines.
    pub resource_group: String,
    /// Virtual network name.
    pub vnet: String,
    /// Subnet name.
    pub subnet: String,
    /// Subnet CIDR.
    pub subnet_prefix: String,
    /// Login user.
    pub ssh_user: String,
    /// Ports opened on the network security group.
    pub open_port: Vec<String>,
}

impl Default for AzureMachineConfig {
    fn default() -> Self {
        Self {
            environment: String::from("AzurePublicCloud"),
            location: String::from("westus"),
            image: String::from("canonical:0001-com-ubuntu-server-jammy:22_04-lts:latest"),
            size: String::from("Standard_D2_v2"),
            disk_size: String::from("30"),
            managed_disks: false,
            resource_group: String::from("docker-machine"),
            vnet: String::from("docker-machine-vnet"),
            subnet: String::from("docker-machine"),
            subnet_prefix: String::from("192.168.0.0/16"),
            ssh_user: String::from("docker-user"),
            open_port: vec![
                String::from("6443/tcp"),
                String::from("2379/tcp"),
                String::from("2380/tcp"),
                String::from("8472/udp"),
                String::from("10250/tcp"),
            ],
        }
    }
}

/// Inputs for the Azure provider.
pub type AzureSection = ProviderSection<AzureCredentials, AzureMachineConfig>;

/// Azure implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct AzureProvider {
    section: AzureSection,
}

impl AzureProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &AzureSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for AzureProvider {
    fn resource_type(&self) -> &'static str {
        AZURE_POOL_TYPE
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
            ProviderName::Azure,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for AzureProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Azure,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for AzureProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Azure,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
