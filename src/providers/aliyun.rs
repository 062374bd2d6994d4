//! Alibaba Cloud ECS instance configs, credentials and node templates.

use serde::{Deserialize, Serialize};

use super::{ProviderSection, submit_cloud_credential, submit_node_template};
use crate::capability::{
    CloudCredentialProvider, FactoryError, FactoryFuture, MachinePoolBuilder, NodeTemplateProvider,
};
use crate::client::{CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Machine-config resource type for ECS pools.
pub const ALIYUN_POOL_TYPE: &str = "rke-machine-config.cattle.io.aliyunecsconfig";
const MACHINE_CONFIG_KIND: &str = "AliyunecsConfig";
const CREDENTIAL_CONFIG_KEY: &str = "aliyunecscredentialConfig";
const NODE_DRIVER: &str = "aliyunecs";
const NODE_TEMPLATE_CONFIG_KEY: &str = "aliyunecsConfig";

/// RAM access key pair.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AliyunCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Access key secret.
    pub access_key_secret: String,
}

/// ECS instance settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AliyunMachineConfig {
    /// ECS region.
    pub region: String,
    /// Zone within the region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Instance type.
    pub instance_type: String,
    /// Image id; the driver default is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// System disk category.
    pub system_disk_category: String,
    /// System disk size in GiB.
    pub system_disk_size: String,
    /// VSwitch to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vswitch_id: Option<String>,
    /// Public bandwidth cap in Mbps.
    pub internet_max_bandwidth: String,
    /// Only assign a private address.
    pub private_address_only: bool,
}

impl Default for AliyunMachineConfig {
    fn default() -> Self {
        Self {
            region: String::from("cn-hangzhou"),
            zone: None,
            instance_type: String::from("ecs.g6.large"),
            image_id: None,
            system_disk_category: String::from("cloud_efficiency"),
            system_disk_size: String::from("40"),
            vswitch_id: None,
            internet_max_bandwidth: String::from("1"),
            private_address_only: false,
        }
    }
}

/// Inputs for the ECS provider.
pub type AliyunSection = ProviderSection<AliyunCredentials, AliyunMachineConfig>;

/// Alibaba Cloud ECS implementation of the provider capabilities.
#[derive(Clone, Debug)]
pub struct AliyunProvider {
    section: AliyunSection,
}

impl AliyunProvider {
    /// Builds the provider from its inputs.
    #[must_use]
    pub fn new(section: &AliyunSection) -> Self {
        Self {
            section: section.with_default_pool(),
        }
    }
}

impl MachinePoolBuilder for AliyunProvider {
    fn resource_type(&self) -> &'static str {
        ALIYUN_POOL_TYPE
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
            ProviderName::Aliyun,
            MACHINE_CONFIG_KIND,
            pool_name,
            namespace,
        )
    }
}

impl CloudCredentialProvider for AliyunProvider {
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential> {
        Box::pin(submit_cloud_credential(
            client,
            ProviderName::Aliyun,
            CREDENTIAL_CONFIG_KEY,
            self.section.credentials.as_ref(),
        ))
    }
}

impl NodeTemplateProvider for AliyunProvider {
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate> {
        Box::pin(submit_node_template(
            client,
            ProviderName::Aliyun,
            NODE_DRIVER,
            NODE_TEMPLATE_CONFIG_KEY,
            self.section.node_template.as_ref(),
        ))
    }
}
