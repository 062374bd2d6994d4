//! Orchestration API client seam used by credential and node-template
//! factories.
//!
//! The registry never talks to the orchestration API itself. Factories build
//! request documents and hand them to an [`OrchestrationClient`]; callers
//! supply the implementation. [`DryRunClient`] is an in-memory implementation
//! that records every request and fabricates identifiers.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::provider::ProviderName;

/// Resource type of cloud-credential requests.
pub const CLOUD_CREDENTIAL_TYPE: &str = "cloudCredential";
/// Resource type of node-template requests.
pub const NODE_TEMPLATE_TYPE: &str = "nodeTemplate";
/// Name prefix for generated cloud credentials.
pub const CLOUD_CREDENTIAL_NAME_PREFIX: &str = "cc-";
/// Name prefix for generated node templates.
pub const NODE_TEMPLATE_NAME_PREFIX: &str = "nt-";

const CLOUD_CREDENTIAL_NAMESPACE: &str = "cattle-global-data";
const NODE_TEMPLATE_NAMESPACE: &str = "cattle-global-nt";
const GENERATED_SUFFIX_LEN: usize = 5;

/// Errors raised by orchestration API clients.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// The API refused the request.
    #[error("{resource} request rejected: {message}")]
    Rejected {
        /// Resource type of the rejected request.
        resource: String,
        /// Message returned by the API.
        message: String,
    },
    /// The API could not be reached.
    #[error("orchestration API unavailable: {0}")]
    Unavailable(String),
}

/// Future returned by client operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Request to create a cloud credential.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudCredentialSpec {
    /// Provider the credential authorises.
    pub provider: ProviderName,
    /// Name prefix completed by the API.
    pub generate_name: String,
    /// Key holding the provider specific credential block
    /// (for example `amazonec2credentialConfig`).
    pub config_key: &'static str,
    /// Provider specific credential block.
    pub config: Value,
}

impl CloudCredentialSpec {
    /// Renders the request body sent to the orchestration API.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(String::from("type"), Value::from(CLOUD_CREDENTIAL_TYPE));
        body.insert(
            String::from("generateName"),
            Value::from(self.generate_name.as_str()),
        );
        body.insert(self.config_key.to_owned(), self.config.clone());
        Value::Object(body)
    }
}

/// Request to create a legacy node template.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTemplateSpec {
    /// Provider the template provisions on.
    pub provider: ProviderName,
    /// Name prefix completed by the API.
    pub generate_name: String,
    /// Machine driver name (for example `amazonec2`).
    pub driver: &'static str,
    /// Key holding the driver specific block (for example `amazonec2Config`).
    pub config_key: &'static str,
    /// Driver specific machine settings.
    pub config: Value,
    /// Script used to install the container engine on new nodes.
    pub engine_install_url: String,
}

impl NodeTemplateSpec {
    /// Renders the request body sent to the orchestration API.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert(String::from("type"), Value::from(NODE_TEMPLATE_TYPE));
        body.insert(
            String::from("generateName"),
            Value::from(self.generate_name.as_str()),
        );
        body.insert(String::from("driver"), Value::from(self.driver));
        body.insert(
            String::from("engineInstallURL"),
            Value::from(self.engine_install_url.as_str()),
        );
        body.insert(self.config_key.to_owned(), self.config.clone());
        Value::Object(body)
    }
}

/// Cloud credential created by the orchestration API.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CloudCredential {
    /// Fully qualified identifier (`<namespace>:<name>`).
    pub id: String,
    /// Generated name.
    pub name: String,
    /// Provider the credential authorises.
    pub provider: ProviderName,
}

/// Node template created by the orchestration API.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NodeTemplate {
    /// Fully qualified identifier (`<namespace>:<name>`).
    pub id: String,
    /// Generated name.
    pub name: String,
    /// Machine driver backing the template.
    pub driver: String,
    /// Provider the template provisions on.
    pub provider: ProviderName,
}

/// Authenticated handle to the orchestration API.
pub trait OrchestrationClient: Send + Sync {
    /// Creates a cloud credential from the request.
    fn create_cloud_credential<'a>(
        &'a self,
        spec: &'a CloudCredentialSpec,
    ) -> ClientFuture<'a, CloudCredential>;

    /// Creates a node template from the request.
    fn create_node_template<'a>(
        &'a self,
        spec: &'a NodeTemplateSpec,
    ) -> ClientFuture<'a, NodeTemplate>;
}

/// Client that accepts every request without contacting an API.
#[derive(Debug, Default)]
pub struct DryRunClient {
    requests: Mutex<Vec<Value>>,
}

impl DryRunClient {
    /// Creates a client with an empty request log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bodies of every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, body: Value) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(body);
    }
}

fn generated_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(GENERATED_SUFFIX_LEN)
        .collect()
}

impl OrchestrationClient for DryRunClient {
    fn create_cloud_credential<'a>(
        &'a self,
        spec: &'a CloudCredentialSpec,
    ) -> ClientFuture<'a, CloudCredential> {
        Box::pin(async move {
            self.record(spec.body());
            let name = format!("{}{}", spec.generate_name, generated_suffix());
            debug!(provider = %spec.provider, %name, "dry-run cloud credential");
            Ok(CloudCredential {
                id: format!("{CLOUD_CREDENTIAL_NAMESPACE}:{name}"),
                name,
                provider: spec.provider,
            })
        })
    }

    fn create_node_template<'a>(
        &'a self,
        spec: &'a NodeTemplateSpec,
    ) -> ClientFuture<'a, NodeTemplate> {
        Box::pin(async move {
            self.record(spec.body());
            let name = format!("{}{}", spec.generate_name, generated_suffix());
            debug!(provider = %spec.provider, %name, "dry-run node template");
            Ok(NodeTemplate {
                id: format!("{NODE_TEMPLATE_NAMESPACE}:{name}"),
                name,
                driver: spec.driver.to_owned(),
                provider: spec.provider,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential_spec() -> CloudCredentialSpec {
        CloudCredentialSpec {
            provider: ProviderName::Linode,
            generate_name: CLOUD_CREDENTIAL_NAME_PREFIX.to_owned(),
            config_key: "linodecredentialConfig",
            config: json!({"token": "abc"}),
        }
    }

    #[test]
    fn credential_body_nests_config_under_key() {
        assert_eq!(
            credential_spec().body(),
            json!({
                "type": "cloudCredential",
                "generateName": "cc-",
                "linodecredentialConfig": {"token": "abc"},
            })
        );
    }

    #[tokio::test]
    async fn dry_run_records_requests_and_generates_names() {
        let client = DryRunClient::new();
        let spec = credential_spec();

        let credential = client
            .create_cloud_credential(&spec)
            .await
            .unwrap_or_else(|err| panic!("dry run should accept: {err}"));

        assert!(credential.name.starts_with("cc-"));
        assert_eq!(credential.name.len(), 3 + GENERATED_SUFFIX_LEN);
        assert_eq!(credential.id, format!("cattle-global-data:{}", credential.name));
        assert_eq!(client.requests(), vec![spec.body()]);
    }
}
