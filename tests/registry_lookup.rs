//! Lookup behaviour of the provisioning and legacy registries.

#[path = "common/test_constants.rs"]
mod test_constants;

use provreg::test_support::sample_inputs;
use provreg::{
    LegacyRegistry, MachineRole, ProviderInputs, ProviderName, ProvisioningRegistry,
    RegistryError, RegistryKind,
};
use rstest::{fixture, rstest};

use test_constants::{AWS_RESOURCE_TYPE, CANONICAL_NAMES};

#[fixture]
fn provisioning() -> ProvisioningRegistry {
    ProvisioningRegistry::new(&ProviderInputs::default())
}

#[fixture]
fn legacy() -> LegacyRegistry {
    LegacyRegistry::new(&ProviderInputs::default())
}

#[rstest]
fn every_canonical_name_resolves_in_provisioning(provisioning: ProvisioningRegistry) {
    for name in CANONICAL_NAMES {
        let bundle = provisioning
            .resolve_provider(name)
            .unwrap_or_else(|err| panic!("{name} should resolve: {err}"));
        assert_eq!(bundle.name.as_str(), name);
        assert!(!bundle.resource_type.is_empty(), "{name} resource type empty");
        assert!(!bundle.roles.is_empty(), "{name} roles empty");
    }
}

#[rstest]
fn supported_lists_match_canonical_order(
    provisioning: ProvisioningRegistry,
    legacy: LegacyRegistry,
) {
    let provisioning_names: Vec<&str> = provisioning
        .supported()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(provisioning_names, CANONICAL_NAMES);

    let legacy_names: Vec<&str> = legacy.supported().iter().map(|name| name.as_str()).collect();
    let expected: Vec<&str> = CANONICAL_NAMES
        .into_iter()
        .filter(|name| *name != "do")
        .collect();
    assert_eq!(legacy_names, expected);
}

#[rstest]
#[case("aws")]
#[case("azure")]
#[case("linode")]
#[case("harvester")]
#[case("vsphere")]
#[case("aliyunecs")]
fn legacy_providers_resolve(legacy: LegacyRegistry, #[case] name: &str) {
    let bundle = legacy
        .resolve_rke1_provider(name)
        .unwrap_or_else(|err| panic!("{name} should resolve: {err}"));
    assert_eq!(bundle.name.as_str(), name);
}

#[rstest]
fn digitalocean_is_provisioning_only(provisioning: ProvisioningRegistry, legacy: LegacyRegistry) {
    assert_eq!(
        provisioning
            .resolve_provider("do")
            .map(|bundle| bundle.name)
            .ok(),
        Some(ProviderName::DigitalOcean)
    );
    assert_eq!(
        legacy
            .resolve_rke1_provider("do")
            .expect_err("do should be absent from the legacy registry"),
        RegistryError::UnknownProvider {
            name: String::from("do"),
            registry: RegistryKind::Legacy,
        }
    );
}

#[rstest]
#[case("")]
#[case("gce")]
#[case("AWS")]
#[case("Aws")]
#[case(" aws")]
#[case("digitalocean")]
#[case("aliyun")]
fn unknown_names_fail_in_both_registries(
    provisioning: ProvisioningRegistry,
    legacy: LegacyRegistry,
    #[case] name: &str,
) {
    assert_eq!(
        provisioning
            .resolve_provider(name)
            .expect_err("name should be unknown"),
        RegistryError::UnknownProvider {
            name: name.to_owned(),
            registry: RegistryKind::Provisioning,
        }
    );
    assert_eq!(
        legacy
            .resolve_rke1_provider(name)
            .expect_err("name should be unknown"),
        RegistryError::UnknownProvider {
            name: name.to_owned(),
            registry: RegistryKind::Legacy,
        }
    );
}

#[test]
fn repeated_lookups_agree() {
    let inputs = sample_inputs().unwrap_or_else(|err| panic!("sample inputs: {err}"));
    let registry = ProvisioningRegistry::new(&inputs);
    for name in ProviderName::ALL {
        let first = registry.resolve(name);
        let second = registry.resolve(name);
        assert_eq!(first.name, second.name);
        assert_eq!(first.resource_type, second.resource_type);
        assert_eq!(first.roles, second.roles);
        assert_eq!(
            first.machine_pools.build("nc-a-pool0-", "ns"),
            second.machine_pools.build("nc-a-pool0-", "ns")
        );
        assert!(first.machine_pools.build("nc-a-pool0-", "ns").is_ok());
    }
}

#[rstest]
fn aws_bundle_describes_amazonec2_with_control_plane(provisioning: ProvisioningRegistry) {
    let bundle = provisioning
        .resolve_provider("aws")
        .unwrap_or_else(|err| panic!("aws should resolve: {err}"));
    assert_eq!(bundle.resource_type, AWS_RESOURCE_TYPE);
    assert!(
        bundle
            .roles
            .iter()
            .any(|pool| pool.roles().contains(&MachineRole::ControlPlane)),
        "aws roles should include a control-plane pool: {:?}",
        bundle.roles
    );
}

#[rstest]
fn resource_type_matches_builder(provisioning: ProvisioningRegistry) {
    for name in ProviderName::ALL {
        let bundle = provisioning.resolve(name);
        assert_eq!(bundle.resource_type, bundle.machine_pools.resource_type());
        assert_eq!(bundle.roles, bundle.machine_pools.roles());
        assert!(
            bundle
                .resource_type
                .starts_with("rke-machine-config.cattle.io."),
            "unexpected resource type for {name}: {}",
            bundle.resource_type
        );
    }
}

#[rstest]
fn registries_are_shareable_across_threads(provisioning: ProvisioningRegistry) {
    std::thread::scope(|scope| {
        let handles: Vec<_> = ProviderName::ALL
            .into_iter()
            .map(|name| {
                let registry = &provisioning;
                scope.spawn(move || registry.resolve(name).resource_type)
            })
            .collect();
        for handle in handles {
            let resource_type = handle.join().unwrap_or_else(|_| panic!("lookup thread panicked"));
            assert!(!resource_type.is_empty());
        }
    });
}
