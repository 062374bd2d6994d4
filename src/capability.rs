//! Capabilities carried by registry bundles, one implementation per provider.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::client::{ClientError, CloudCredential, NodeTemplate, OrchestrationClient};
use crate::provider::ProviderName;
use crate::resource::ResourceDescriptor;
use crate::roles::PoolRoles;

/// Errors raised by provider factories.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FactoryError {
    /// The provider inputs lack the section needed to build the request.
    #[error("{provider} inputs have no {section} section")]
    MissingInput {
        /// Provider whose inputs are incomplete.
        provider: ProviderName,
        /// Missing section (for example `credentials`).
        section: &'static str,
    },
    /// A provider block could not be encoded into the request.
    #[error("failed to encode {provider} {section}: {message}")]
    Encode {
        /// Provider whose block failed to encode.
        provider: ProviderName,
        /// Section being encoded.
        section: &'static str,
        /// Encoder message.
        message: String,
    },
    /// The orchestration client failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Future returned by provider factories.
pub type FactoryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FactoryError>> + Send + 'a>>;

/// Builds the machine-config resources of a provider's machine pools.
pub trait MachinePoolBuilder: Send + Sync {
    /// Resource type identifying the provider's machine configs.
    fn resource_type(&self) -> &'static str;

    /// Roles of each pool, in the same order as [`Self::build`] output.
    fn roles(&self) -> Vec<PoolRoles>;

    /// Produces one machine-config resource per pool.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Encode`] when a pool's settings cannot be
    /// rendered into a resource.
    fn build(
        &self,
        pool_name: &str,
        namespace: &str,
    ) -> Result<Vec<ResourceDescriptor>, FactoryError>;
}

/// Creates the cloud credential a provider's machines authenticate with.
pub trait CloudCredentialProvider: Send + Sync {
    /// Submits the provider's credential request through `client`.
    fn create_cloud_credential<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, CloudCredential>;
}

/// Creates the node template used by legacy (RKE1) provisioning.
pub trait NodeTemplateProvider: Send + Sync {
    /// Submits the provider's node-template request through `client`.
    fn create_node_template<'a>(
        &'a self,
        client: &'a dyn OrchestrationClient,
    ) -> FactoryFuture<'a, NodeTemplate>;
}
