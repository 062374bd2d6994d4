//! vSphere virtual machine configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for vSphere pools.
pub const VSPHERE_POOL_TYPE: &str = "rke-machine-config.cattle.io.vmwarevsphereconfig";
const MACHINE_CONFIG_KIND: &str = "VmwarevsphereConfig";
const CREDENTIAL_CONFIG_KEY: &str = "vmwarevspherecredentialConfig";
const NODE_DRIVER: &str = "vmwarevsphere";
const NODE_TEMPLATE_CONFIG_KEY: &str = "vmwarevsphereConfig";

/// vCenter endpoint and login.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VsphereCredentials {
    /// vCenter host name.
    pub vcenter: String,
    /// vCenter HTTPS port.
    #[serde(default = "default_vcenter_port")]
    pub vcenter_port: String,
    /// vCenter user.
    pub username: String,
    /// vCenter password.
    pub password: String,
}

fn default_vcenter_port() -> String {
    String::from("443")
}

/// vSphere virtual machine settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VsphereMachineConfig {
    /// `vm`, `template`, `library` or `legacy`.
    pub creation_type: String,
    /// Source VM, template or content library item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_from: Option<String>,
    /// Datacenter inventory path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<String>,
    /// Datastore inventory path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
    /// VM folder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Resource pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    /// Networks attached to the VM.
    pub network: Vec<String>,
    /// Virtual CPU count.
    pub cpu_count: String,
    /// Memory in MiB.
    pub memory_size: String,
    /// Disk in MiB.
    pub disk_size: String,
    /// Login user.
    pub ssh_user: String,
}

impl Default for VsphereMachineConfig {
    fn default() -> Self {
        Self {
            creation_type: String::from("template"),
            clone_from: None,
            datacenter: None,
            datastore: None,
            folder: None,
            pool: None,
            network: Vec::new(),
            cpu_count: String::from("2"),
            memory_size: String::from("4096"),
            disk_size: String::from("20000"),
            ssh_user: String::from("docker"),
        }
    }
}

/// Inputs for the vSphere provider.
pub type VsphereSection = ProviderSection<VsphereCredentials, VsphereMachineConfig>;

/// vSphere implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct VsphereProvider {
    section: VsphereSection,
}

impl VsphereProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &VsphereSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for VsphereProvider {
    fn resource_type(&self) -> &'static str {
        VSPHERE_POOL_TYPE
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
            ProviderName::Vsphere,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for VsphereProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Vsphere,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for VsphereProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Vsphere,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
