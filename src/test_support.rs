//! Test support utilities shared across unit and integration tests.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;

use tokio::sync::{Mutex, MutexGuard};

use crate::client::{
    ClientError, ClientFuture, CloudCredential, CloudCredentialSpec, NodeTemplate,
    NodeTemplateSpec, OrchestrationClient, CLOUD_CREDENTIAL_TYPE, NODE_TEMPLATE_TYPE,
};
use crate::inputs::{InputsError, ProviderInputs};

/// Inputs covering every provider: credentials everywhere, two AWS pools and a
/// node template for each legacy provider.
pub const SAMPLE_INPUTS_TOML: &str = r#"
[aws.credentials]
accessKey = "AKIAEXAMPLE"
secretKey = "aws-secret"
defaultRegion = "us-east-2"

[[aws.machineConfigs]]
instanceType = "t3a.xlarge"
roles = { etcd = true, controlPlane = true, worker = false }

[[aws.machineConfigs]]
instanceType = "t3a.medium"
roles = { etcd = false, controlPlane = false, worker = true, quantity = 3 }

[aws.nodeTemplate]
instanceType = "t3a.medium"

[azure.credentials]
clientId = "azure-client"
clientSecret = "azure-secret"
subscriptionId = "azure-subscription"

[azure.nodeTemplate]
location = "eastus"

[digitalocean.credentials]
accessToken = "do-token"

[linode.credentials]
token = "linode-token"

[linode.nodeTemplate]
region = "us-east"

[harvester.credentials]
clusterId = "c-m-abc123"
clusterType = "imported"
kubeconfigContent = "apiVersion: v1"

[harvester.nodeTemplate]
imageName = "default/ubuntu-jammy"
networkName = "default/vlan1"

[vsphere.credentials]
vcenter = "vcenter.example.test"
username = "administrator@vsphere.local"
password = "vsphere-secret"

[vsphere.nodeTemplate]
cloneFrom = "/dc/vm/ubuntu-template"

[aliyun.credentials]
accessKeyId = "aliyun-id"
accessKeySecret = "aliyun-secret"

[aliyun.nodeTemplate]
region = "cn-shanghai"
"#;

/// Parses [`SAMPLE_INPUTS_TOML`].
///
/// # Errors
///
/// Returns [`InputsError`] if the sample stops parsing or validating.
pub fn sample_inputs() -> Result<ProviderInputs, InputsError> {
    ProviderInputs::from_toml_str(SAMPLE_INPUTS_TOML)
}

/// Client that rejects every request with a fixed message.
#[derive(Clone, Debug)]
pub struct FailingClient {
    message: String,
}

impl FailingClient {
    /// Creates a client rejecting requests with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn rejected(&self, resource: &str) -> ClientError {
        ClientError::Rejected {
            resource: resource.to_owned(),
            message: self.message.clone(),
        }
    }
}

impl OrchestrationClient for FailingClient {
    fn create_cloud_credential<'a>(
        &'a self,
        _spec: &'a CloudCredentialSpec,
    ) -> ClientFuture<'a, CloudCredential> {
        Box::pin(async move { Err(self.rejected(CLOUD_CREDENTIAL_TYPE)) })
    }

    fn create_node_template<'a>(
        &'a self,
        _spec: &'a NodeTemplateSpec,
    ) -> ClientFuture<'a, NodeTemplate> {
        Box::pin(async move { Err(self.rejected(NODE_TEMPLATE_TYPE)) })
    }
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::const_new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    pub async fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().await;
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
