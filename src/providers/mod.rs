//! Provider implementations of the registry capabilities.
//!
//! Every provider module defines its credential block, its machine-config
//! settings and a provider type implementing [`MachinePoolBuilder`],
//! [`CloudCredentialProvider`] and, where legacy provisioning supports it,
//! [`NodeTemplateProvider`]. The inputs for each provider arrive as a
//! [`ProviderSection`] loaded from the inputs file.
//!
//! [`MachinePoolBuilder`]: crate::capability::MachinePoolBuilder
//! [`CloudCredentialProvider`]: crate::capability::CloudCredentialProvider
//! [`NodeTemplateProvider`]: crate::capability::NodeTemplateProvider

mod aliyun;
mod aws;
mod azure;
mod digitalocean;
mod harvester;
mod linode;
mod vsphere;

pub use aliyun::{
    ALIYUN_POOL_TYPE, AliyunCredentials, AliyunMachineConfig, AliyunProvider, AliyunSection,
};
pub use aws::{AWS_POOL_TYPE, AwsCredentials, AwsMachineConfig, AwsProvider, AwsSection};
pub use azure::{AZURE_POOL_TYPE, AzureCredentials, AzureMachineConfig, AzureProvider, AzureSection};
pub use digitalocean::{
    DIGITALOCEAN_POOL_TYPE, DigitalOceanCredentials, DigitalOceanMachineConfig,
    DigitalOceanProvider, DigitalOceanSection,
};
pub use harvester::{
    HARVESTER_POOL_TYPE, HarvesterCredentials, HarvesterMachineConfig, HarvesterProvider,
    HarvesterSection,
};
pub use linode::{
    LINODE_POOL_TYPE, LinodeCredentials, LinodeMachineConfig, LinodeProvider, LinodeSection,
};
pub use vsphere::{
    VSPHERE_POOL_TYPE, VsphereCredentials, VsphereMachineConfig, VsphereProvider, VsphereSection,
};

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::capability::FactoryError;
use crate::client::{
    CLOUD_CREDENTIAL_NAME_PREFIX, CloudCredential, CloudCredentialSpec, NODE_TEMPLATE_NAME_PREFIX,
    NodeTemplate, NodeTemplateSpec, OrchestrationClient,
};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Container engine install script referenced by legacy node templates.
pub const DEFAULT_ENGINE_INSTALL_URL: &str = "https://releases.rancher.com/install-docker/24.0.sh";

const CREDENTIALS_SECTION: &str = "credentials";
const NODE_TEMPLATE_SECTION: &str = "nodeTemplate";
const MACHINE_CONFIGS_SECTION: &str = "machineConfigs";
const ROLES_KEY: &str = "roles";

/// Inputs for one provider: credential block, machine pools and the legacy
/// node template.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(deserialize = "C: Deserialize<'de>, M: DeserializeOwned")
)]
pub struct ProviderSection<C, M> {
    /// Credential block submitted when creating a cloud credential.
    pub credentials: Option<C>,
    /// Machine pools, each with its own roles and settings.
    #[serde(default = "Vec::new")]
    pub machine_configs: Vec<MachinePoolConfig<M>>,
    /// Machine settings for the legacy node template.
    pub node_template: Option<M>,
}

impl<C, M> Default for ProviderSection<C, M> {
    fn default() -> Self {
        Self {
            credentials: None,
            machine_configs: Vec::new(),
            node_template: None,
        }
    }
}

/// Settings and roles of one machine pool.
///
/// In the inputs file the pool is a single table: `roles` plus the provider's
/// machine settings side by side. Unknown setting keys are rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct MachinePoolConfig<M> {
    /// Roles carried by the pool's nodes.
    pub roles: PoolRoles,
    /// Provider specific machine settings.
    pub settings: M,
}

impl<M: Default> MachinePoolConfig<M> {
    /// A single all-in-one node with the provider's default settings.
    #[must_use]
    pub fn all_in_one() -> Self {
        Self {
            roles: PoolRoles::all_in_one(),
            settings: M::default(),
        }
    }
}

impl<'de, M: DeserializeOwned> Deserialize<'de> for MachinePoolConfig<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut table = Map::<String, Value>::deserialize(deserializer)?;
        let roles_value = table
            .remove(ROLES_KEY)
            .ok_or_else(|| D::Error::missing_field(ROLES_KEY))?;
        let roles = PoolRoles::deserialize(roles_value).map_err(D::Error::custom)?;
        let settings = M::deserialize(Value::Object(table)).map_err(D::Error::custom)?;
        Ok(Self { roles, settings })
    }
}

impl<C: Clone, M: Clone + Default> ProviderSection<C, M> {
    /// Returns a copy whose pool list falls back to a single default pool
    /// when none is configured.
    #[must_use]
    pub fn with_default_pool(&self) -> Self {
        let mut section = self.clone();
        if section.machine_configs.is_empty() {
            section.machine_configs.push(MachinePoolConfig::all_in_one());
        }
        section
    }
}

impl<C, M> ProviderSection<C, M> {
    /// Checks every configured pool's role combination.
    ///
    /// # Errors
    ///
    /// Returns the index of the first invalid pool and the reason.
    pub fn validate_pools(&self) -> Result<(), (usize, String)> {
        self.machine_configs
            .iter()
            .enumerate()
            .try_for_each(|(index, pool)| pool.roles.validate().map_err(|reason| (index, reason)))
    }

    fn pool_roles(&self) -> Vec<PoolRoles> {
        self.machine_configs.iter().map(|pool| pool.roles).collect()
    }
}

impl<C, M: Serialize> ProviderSection<C, M> {
    fn descriptors(
        &self,
        provider: ProviderName,
        kind: &str,
        pool_name: &str,
        namespace: &str,
    ) -> Result<Vec<ResourceDescriptor>, FactoryError> {
        self.machine_configs
            .iter()
            .map(|pool| {
                ResourceDescriptor::new(kind, pool_name, namespace)
                    .with_fields(&pool.settings)
                    .map_err(|err| FactoryError::Encode {
                        provider,
                        section: MACHINE_CONFIGS_SECTION,
                        message: err.to_string(),
                    })
            })
            .collect()
    }
}

fn encode<T: Serialize>(
    provider: ProviderName,
    section: &'static str,
    block: &T,
) -> Result<Value, FactoryError> {
    serde_json::to_value(block).map_err(|err| FactoryError::Encode {
        provider,
        section,
        message: err.to_string(),
    })
}

async fn submit_cloud_credential<C: Serialize + Sync>(
    client: &dyn OrchestrationClient,
    provider: ProviderName,
    config_key: &'static str,
    credentials: Option<&C>,
) -> Result<CloudCredential, FactoryError> {
    let Some(block) = credentials else {
        return Err(FactoryError::MissingInput {
            provider,
            section: CREDENTIALS_SECTION,
        });
    };
    let spec = CloudCredentialSpec {
        provider,
        generate_name: CLOUD_CREDENTIAL_NAME_PREFIX.to_owned(),
        config_key,
        config: encode(provider, CREDENTIALS_SECTION, block)?,
    };
    debug!(%provider, config_key, "submitting cloud credential");
    Ok(client.create_cloud_credential(&spec).await?)
}

async fn submit_node_template<M: Serialize + Sync>(
    client: &dyn OrchestrationClient,
    provider: ProviderName,
    driver: &'static str,
    config_key: &'static str,
    template: Option<&M>,
) -> Result<NodeTemplate, FactoryError> {
    let Some(settings) = template else {
        return Err(FactoryError::MissingInput {
            provider,
            section: NODE_TEMPLATE_SECTION,
        });
    };
    let spec = NodeTemplateSpec {
        provider,
        generate_name: NODE_TEMPLATE_NAME_PREFIX.to_owned(),
        driver,
        config_key,
        config: encode(provider, NODE_TEMPLATE_SECTION, settings)?,
        engine_install_url: DEFAULT_ENGINE_INSTALL_URL.to_owned(),
    };
    debug!(%provider, driver, "submitting node template");
    Ok(client.create_node_template(&spec).await?)
}
