//! Factories reached through registry bundles, driven against in-memory
//! orchestration clients.

use provreg::test_support::{FailingClient, sample_inputs};
use provreg::{
    ClientError, DryRunClient, FactoryError, LegacyRegistry, ProviderInputs, ProviderName,
    ProvisioningRegistry, generate_pool_name,
};
use rstest::{fixture, rstest};

#[fixture]
fn inputs() -> ProviderInputs {
    sample_inputs().unwrap_or_else(|err| panic!("sample inputs: {err}"))
}

#[rstest]
#[tokio::test]
async fn every_provider_creates_a_cloud_credential(inputs: ProviderInputs) {
    let registry = ProvisioningRegistry::new(&inputs);
    let client = DryRunClient::new();

    for name in ProviderName::ALL {
        let credential = registry
            .resolve(name)
            .cloud_credentials
            .create_cloud_credential(&client)
            .await
            .unwrap_or_else(|err| panic!("{name} credential: {err}"));
        assert_eq!(credential.provider, name);
        assert!(
            credential.id.starts_with("cattle-global-data:cc-"),
            "unexpected id: {}",
            credential.id
        );
    }
    assert_eq!(client.requests().len(), ProviderName::ALL.len());
}

#[rstest]
#[tokio::test]
async fn aws_credential_request_carries_keys(inputs: ProviderInputs) {
    let client = DryRunClient::new();
    ProvisioningRegistry::new(&inputs)
        .resolve(ProviderName::Aws)
        .cloud_credentials
        .create_cloud_credential(&client)
        .await
        .unwrap_or_else(|err| panic!("aws credential: {err}"));

    let requests = client.requests();
    let body = requests.first().unwrap_or_else(|| panic!("no request recorded"));
    assert_eq!(body["type"], "cloudCredential");
    assert_eq!(body["generateName"], "cc-");
    assert_eq!(body["amazonec2credentialConfig"]["accessKey"], "AKIAEXAMPLE");
    assert_eq!(body["amazonec2credentialConfig"]["defaultRegion"], "us-east-2");
}

#[rstest]
#[tokio::test]
async fn legacy_providers_create_node_templates(inputs: ProviderInputs) {
    let registry = LegacyRegistry::new(&inputs);
    let client = DryRunClient::new();

    for name in registry.supported() {
        let template = registry
            .resolve(*name)
            .unwrap_or_else(|err| panic!("{name} should resolve: {err}"))
            .node_templates
            .create_node_template(&client)
            .await
            .unwrap_or_else(|err| panic!("{name} node template: {err}"));
        assert_eq!(template.provider, *name);
        assert!(template.id.starts_with("cattle-global-nt:nt-"));
    }

    let requests = client.requests();
    assert_eq!(requests.len(), 6);
    assert!(
        requests
            .iter()
            .all(|body| body["engineInstallURL"].as_str().is_some()),
        "every template should name an engine install script"
    );
}

#[tokio::test]
async fn missing_credentials_are_reported_per_provider() {
    let registry = ProvisioningRegistry::new(&ProviderInputs::default());
    let err = registry
        .resolve(ProviderName::Harvester)
        .cloud_credentials
        .create_cloud_credential(&DryRunClient::new())
        .await
        .expect_err("credentials are missing");

    assert_eq!(
        err,
        FactoryError::MissingInput {
            provider: ProviderName::Harvester,
            section: "credentials",
        }
    );
}

#[tokio::test]
async fn missing_node_template_is_reported() {
    let registry = LegacyRegistry::new(&ProviderInputs::default());
    let bundle = registry
        .resolve(ProviderName::Vsphere)
        .unwrap_or_else(|err| panic!("vsphere should resolve: {err}"));
    let err = bundle
        .node_templates
        .create_node_template(&DryRunClient::new())
        .await
        .expect_err("node template is missing");

    assert_eq!(
        err,
        FactoryError::MissingInput {
            provider: ProviderName::Vsphere,
            section: "nodeTemplate",
        }
    );
}

#[rstest]
#[tokio::test]
async fn client_failures_pass_through_unchanged(inputs: ProviderInputs) {
    let client = FailingClient::new("quota exceeded");
    let err = ProvisioningRegistry::new(&inputs)
        .resolve(ProviderName::Linode)
        .cloud_credentials
        .create_cloud_credential(&client)
        .await
        .expect_err("client should reject");

    assert_eq!(
        err,
        FactoryError::Client(ClientError::Rejected {
            resource: String::from("cloudCredential"),
            message: String::from("quota exceeded"),
        })
    );
    assert_eq!(err.to_string(), "cloudCredential request rejected: quota exceeded");
}

#[rstest]
fn machine_pools_follow_configured_pools(inputs: ProviderInputs) {
    let bundle = ProvisioningRegistry::new(&inputs).resolve(ProviderName::Aws);
    let pool_name = generate_pool_name("demo", 1);
    let descriptors = bundle
        .machine_pools
        .build(&pool_name, "fleet-default")
        .unwrap_or_else(|err| panic!("build pools: {err}"));

    assert_eq!(descriptors.len(), bundle.roles.len());
    let [control, workers] = descriptors.as_slice() else {
        panic!("expected two descriptors, got {}", descriptors.len());
    };
    assert_eq!(control.kind, "Amazonec2Config");
    assert_eq!(control.metadata.generate_name, "nc-demo-pool1-");
    assert_eq!(
        control.field("instanceType").and_then(|value| value.as_str()),
        Some("t3a.xlarge")
    );
    assert_eq!(
        workers.field("instanceType").and_then(|value| value.as_str()),
        Some("t3a.medium")
    );
}
