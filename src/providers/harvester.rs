//! Harvester virtual machine configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for Harvester pools.
pub const HARVESTER_POOL_TYPE: &str = "rke-machine-config.cattle.io.harvesterconfig";
const MACHINE_CONFIG_KIND: &str = "HarvesterConfig";
const CREDENTIAL_CONFIG_KEY: &str = "harvestercredentialConfig";
const NODE_DRIVER: &str = "harvester";
const NODE_TEMPLATE_CONFIG_KEY: &str = "harvesterConfig";

/// Access to a Harvester cluster.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HarvesterCredentials {
    /// Cluster id of an imported Harvester cluster.
    pub cluster_id: String,
    /// `imported` or `external`.
    pub cluster_type: String,
    /// Kubeconfig of the Harvester cluster.
    pub kubeconfig_content: String,
}

/// Harvester virtual machine settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct HarvesterMachineConfig {
    /// Namespace the VMs are created in.
    pub vm_namespace: String,
    /// Virtual CPU count.
    pub cpu_count: String,
    /// Memory in GiB.
    pub memory_size: String,
    /// Root disk in GiB.
    pub disk_size: String,
    /// Disk bus.
    pub disk_bus: String,
    /// `<namespace>/<name>` of the VM image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// `<namespace>/<name>` of the VM network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
    /// NIC model.
    pub network_model: String,
    /// Login user.
    pub ssh_user: String,
}

impl Default for HarvesterMachineConfig {
    fn default() -> Self {
        Self {
            vm_namespace: String::from("default"),
            cpu_count: String::from("2"),
            memory_size: String::from("4"),
            disk_size: String::from("40"),
            disk_bus: String::from("virtio"),
            image_name: None,
            network_name: None,
            network_model: String::from("virtio"),
            ssh_user: String::from("ubuntu"),
        }
    }
}

/// Inputs for the Harvester provider.
pub type HarvesterSection = ProviderSection<HarvesterCredentials, HarvesterMachineConfig>;

/// Harvester implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct HarvesterProvider {
    section: HarvesterSection,
}

impl HarvesterProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &HarvesterSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for HarvesterProvider {
    fn resource_type(&self) -> &'static str {
        HARVESTER_POOL_TYPE
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
            ProviderName::Harvester,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for HarvesterProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Harvester,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for HarvesterProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Harvester,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
