//! Linode instance configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for Linode pools.
pub const LINODE_POOL_TYPE: &str = "rke-machine-config.cattle.io.linodeconfig";
const MACHINE_CONFIG_KIND: &str = "LinodeConfig";
const CREDENTIAL_CONFIG_KEY: &str = "linodecredentialConfig";
const NODE_DRIVER: &str = "linode";
const NODE_TEMPLATE_CONFIG_KEY: &str = "linodeConfig";

/// Linode API token.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinodeCredentials {
    /// Personal access token.
    pub token: String,
}

/// Linode instance settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LinodeMachineConfig {
    /// Image slug.
    pub image: String,
    /// Region slug.
    pub region: String,
    /// Linode plan.
    pub instance_type: String,
    /// Login user.
    pub ssh_user: String,
    /// SSH port.
    pub ssh_port: String,
    /// Swap size in MiB.
    pub swap_size: String,
    /// Attach a private address.
    pub create_private_ip: bool,
    /// Comma separated instance tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Comma separated Linode users allowed to log in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_users: Option<String>,
}

impl Default for LinodeMachineConfig {
    fn default() -> Self {
        Self {
            image: String::from("linode/ubuntu22.04"),
            region: String::from("us-west"),
            instance_type: String::from("g6-standard-2"),
            ssh_user: String::from("root"),
            ssh_port: String::from("22"),
            swap_size: String::from("512"),
            create_private_ip: false,
            tags: None,
            authorized_users: None,
        }
    }
}

/// Inputs for the Linode provider.
pub type LinodeSection = ProviderSection<LinodeCredentials, LinodeMachineConfig>;

/// Linode implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct LinodeProvider {
    section: LinodeSection,
}

impl LinodeProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &LinodeSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for LinodeProvider {
    fn resource_type(&self) -> &'static str {
        LINODE_POOL_TYPE
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
            ProviderName::Linode,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for LinodeProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Linode,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for LinodeProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Linode,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
