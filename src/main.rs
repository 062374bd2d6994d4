//! Binary entry point for the `provreg` CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use provreg::config::{validate_cluster_name, validate_namespace};
use provreg::{
    ConfigError, DryRunClient, FactoryError, InputsError, LegacyRegistry, PoolRoles,
    ProviderInputs, ProviderName, ProvisioningBundle, ProvisioningRegistry, RegistryConfig,
    RegistryError, generate_pool_name,
};

mod cli;

use cli::{Cli, Command};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Inputs(#[from] InputsError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BundleSummary<'a> {
    name: ProviderName,
    resource_type: &'a str,
    roles: &'a [PoolRoles],
    legacy: bool,
}

impl<'a> BundleSummary<'a> {
    fn new(bundle: &'a ProvisioningBundle, legacy: bool) -> Self {
        Self {
            name: bundle.name,
            resource_type: bundle.resource_type,
            roles: &bundle.roles,
            legacy,
        }
    }
}

#[derive(Debug, Serialize)]
struct DryRunOutput<T> {
    requests: Vec<Value>,
    result: T,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = RegistryConfig::load_without_cli_args()?;
    config.validate()?;
    init_logging(&config.log_filter);

    let explicit = cli
        .inputs
        .as_deref()
        .map(Utf8PathBuf::from)
        .or_else(|| config.inputs_path());
    let inputs = ProviderInputs::discover(explicit.as_deref())?;

    let mut stdout = io::stdout();
    dispatch(cli.command, &config, &inputs, &mut stdout).await
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .try_init()
        .ok();
}

async fn dispatch(
    command: Command,
    config: &RegistryConfig,
    inputs: &ProviderInputs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::List { legacy } => {
            let names = if legacy {
                LegacyRegistry::new(inputs).supported()
            } else {
                ProvisioningRegistry::new(inputs).supported()
            };
            for name in names {
                writeln!(out, "{name}")?;
            }
            Ok(())
        }
        Command::Show { name } => {
            let bundle = ProvisioningRegistry::new(inputs).resolve_provider(&name)?;
            let legacy = LegacyRegistry::new(inputs).supports(bundle.name);
            write_json(out, &BundleSummary::new(&bundle, legacy))
        }
        Command::MachinePools {
            name,
            cluster,
            index,
            namespace,
        } => {
            let bundle = ProvisioningRegistry::new(inputs).resolve_provider(&name)?;
            let target_namespace = namespace.unwrap_or_else(|| config.namespace.clone());
            validate_namespace(&target_namespace)?;
            validate_cluster_name(&cluster)?;
            let pool_name = generate_pool_name(&cluster, index);
            let descriptors = bundle.machine_pools.build(&pool_name, &target_namespace)?;
            write_json(out, &descriptors)
        }
        Command::CloudCredential { name } => {
            let bundle = ProvisioningRegistry::new(inputs).resolve_provider(&name)?;
            let client = DryRunClient::new();
            let result = bundle
                .cloud_credentials
                .create_cloud_credential(&client)
                .await?;
            write_json(
                out,
                &DryRunOutput {
                    requests: client.requests(),
                    result,
                },
            )
        }
        Command::NodeTemplate { name } => {
            let bundle = LegacyRegistry::new(inputs).resolve_rke1_provider(&name)?;
            let client = DryRunClient::new();
            let result = bundle.node_templates.create_node_template(&client).await?;
            write_json(
                out,
                &DryRunOutput {
                    requests: client.requests(),
                    result,
                },
            )
        }
    }
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use provreg::test_support::sample_inputs;
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> RegistryConfig {
        RegistryConfig {
            namespace: String::from("fleet-default"),
            inputs_path: None,
            log_filter: String::from("warn"),
        }
    }

    #[fixture]
    fn inputs() -> ProviderInputs {
        sample_inputs().expect("sample inputs")
    }

    async fn dispatch_to_string(
        command: Command,
        config: &RegistryConfig,
        inputs: &ProviderInputs,
    ) -> Result<String, CliError> {
        let mut buf = Vec::new();
        dispatch(command, config, inputs, &mut buf).await?;
        Ok(String::from_utf8(buf).expect("utf8"))
    }

    fn parse_json(rendered: &str) -> Value {
        serde_json::from_str(rendered).expect("output should be JSON")
    }

    #[rstest]
    #[tokio::test]
    async fn list_prints_every_provider(config: RegistryConfig, inputs: ProviderInputs) {
        let rendered = dispatch_to_string(Command::List { legacy: false }, &config, &inputs)
            .await
            .expect("list");
        assert_eq!(
            rendered,
            "aws\nazure\ndo\nlinode\nharvester\nvsphere\naliyunecs\n"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn legacy_list_skips_digitalocean(config: RegistryConfig, inputs: ProviderInputs) {
        let rendered = dispatch_to_string(Command::List { legacy: true }, &config, &inputs)
            .await
            .expect("list");
        assert!(!rendered.lines().any(|line| line == "do"), "rendered: {rendered}");
        assert_eq!(rendered.lines().count(), 6);
    }

    #[rstest]
    #[tokio::test]
    async fn show_reports_legacy_support(config: RegistryConfig, inputs: ProviderInputs) {
        let rendered = dispatch_to_string(
            Command::Show {
                name: String::from("do"),
            },
            &config,
            &inputs,
        )
        .await
        .expect("show");
        let summary = parse_json(&rendered);
        assert_eq!(summary["name"], "do");
        assert_eq!(
            summary["resourceType"],
            "rke-machine-config.cattle.io.digitaloceanconfig"
        );
        assert_eq!(summary["legacy"], false);
    }

    #[rstest]
    #[tokio::test]
    async fn machine_pools_default_to_configured_namespace(
        config: RegistryConfig,
        inputs: ProviderInputs,
    ) {
        let rendered = dispatch_to_string(
            Command::MachinePools {
                name: String::from("aws"),
                cluster: String::from("demo"),
                index: 2,
                namespace: None,
            },
            &config,
            &inputs,
        )
        .await
        .expect("machine-pools");
        let output = parse_json(&rendered);
        let pools = output.as_array().expect("array");
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0]["metadata"]["namespace"], "fleet-default");
        assert_eq!(pools[0]["metadata"]["generateName"], "nc-demo-pool2-");
    }

    #[rstest]
    #[tokio::test]
    async fn machine_pools_reject_invalid_namespace(
        config: RegistryConfig,
        inputs: ProviderInputs,
    ) {
        let err = dispatch_to_string(
            Command::MachinePools {
                name: String::from("aws"),
                cluster: String::from("demo"),
                index: 0,
                namespace: Some(String::from("Not_Valid")),
            },
            &config,
            &inputs,
        )
        .await
        .expect_err("namespace should be rejected");
        assert!(
            matches!(err, CliError::Config(ConfigError::InvalidNamespace(_))),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn machine_pools_reject_invalid_cluster_name(
        config: RegistryConfig,
        inputs: ProviderInputs,
    ) {
        let err = dispatch_to_string(
            Command::MachinePools {
                name: String::from("aws"),
                cluster: String::from("Demo_X"),
                index: 0,
                namespace: None,
            },
            &config,
            &inputs,
        )
        .await
        .expect_err("cluster name should be rejected");
        assert!(
            matches!(err, CliError::Config(ConfigError::InvalidClusterName(ref cluster)) if cluster == "Demo_X"),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn cloud_credential_dry_run_echoes_request(
        config: RegistryConfig,
        inputs: ProviderInputs,
    ) {
        let rendered = dispatch_to_string(
            Command::CloudCredential {
                name: String::from("linode"),
            },
            &config,
            &inputs,
        )
        .await
        .expect("cloud-credential");
        let output = parse_json(&rendered);
        assert_eq!(output["requests"][0]["type"], "cloudCredential");
        assert_eq!(
            output["requests"][0]["linodecredentialConfig"]["token"],
            "linode-token"
        );
        assert_eq!(output["result"]["provider"], "linode");
    }

    #[rstest]
    #[tokio::test]
    async fn node_template_rejects_digitalocean(config: RegistryConfig, inputs: ProviderInputs) {
        let err = dispatch_to_string(
            Command::NodeTemplate {
                name: String::from("do"),
            },
            &config,
            &inputs,
        )
        .await
        .expect_err("do has no legacy entry");
        assert!(
            matches!(err, CliError::Registry(RegistryError::UnknownProvider { .. })),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn cloud_credential_without_inputs_fails(config: RegistryConfig) {
        let err = dispatch_to_string(
            Command::CloudCredential {
                name: String::from("aws"),
            },
            &config,
            &ProviderInputs::default(),
        )
        .await
        .expect_err("credentials are missing");
        assert_eq!(err.to_string(), "aws inputs have no credentials section");
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Registry(RegistryError::UnknownProvider {
            name: String::from("gce"),
            registry: provreg::RegistryKind::Provisioning,
        });
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            rendered,
            "provisioning registry has no provider named 'gce'\n"
        );
    }
}
