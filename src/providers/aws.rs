//! Amazon EC2 machine configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for EC2 pools.
pub const AWS_POOL_TYPE: &str = "rke-machine-config.cattle.io.amazonec2config";
const MACHINE_CONFIG_KIND: &str = "Amazonec2Config";
const CREDENTIAL_CONFIG_KEY: &str = "amazonec2credentialConfig";
const NODE_DRIVER: &str = "amazonec2";
const NODE_TEMPLATE_CONFIG_KEY: &str = "amazonec2Config";

/// EC2 API key pair.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsCredentials {
    /// IAM access key id.
    pub access_key: String,
    /// IAM secret access key.
    pub secret_key: String,
    /// Region used when a machine config does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_region: Option<String>,
}

/// EC2 instance settings for a pool or node template.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AwsMachineConfig {
    /// EC2 region.
    pub region: String,
    /// Availability zone letter within the region.
    pub zone: String,
    /// AMI id; the driver default is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami: Option<String>,
    /// EC2 instance type.
    pub instance_type: String,
    /// Login user baked into the AMI.
    pub ssh_user: String,
    /// VPC to launch into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    /// Subnet to launch into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    /// EBS volume type for the root disk.
    pub volume_type: String,
    /// Root disk size in GiB.
    pub root_size: String,
    /// Security groups attached to the instance.
    pub security_group: Vec<String>,
    /// Only assign a private address.
    pub private_address_only: bool,
}

impl Default for AwsMachineConfig {
    fn default() -> Self {
        Self {
            region: String::from("us-east-2"),
            zone: String::from("a"),
            ami: None,
            instance_type: String::from("t3a.medium"),
            ssh_user: String::from("ubuntu"),
            vpc_id: None,
            subnet_id: None,
            volume_type: String::from("gp3"),
            root_size: String::from("16"),
            security_group: vec![String::from("rancher-nodes")],
            private_address_only: false,
        }
    }
}

/// Inputs for the EC2 provider.
pub type AwsSection = ProviderSection<AwsCredentials, AwsMachineConfig>;

/// EC2 implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct AwsProvider {
    section: AwsSection,
}

impl AwsProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &AwsSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for AwsProvider {
    fn resource_type(&self) -> &'static str {
        AWS_POOL_TYPE
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
            ProviderName::Aws,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for AwsProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Aws,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for AwsProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Aws,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
