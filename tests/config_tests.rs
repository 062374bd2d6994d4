//! Configuration layering and inputs discovery driven through the
//! environment.

use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use provreg::test_support::{EnvGuard, SAMPLE_INPUTS_TOML};
use provreg::{ConfigError, ProviderInputs, RegistryConfig};
use rstest::*;
use tempfile::TempDir;

struct IsolatedHome {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn isolated_home() -> IsolatedHome {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temp dir should be utf8: {}", path.display()));
    IsolatedHome { _tmp: tmp, root }
}

#[rstest]
#[tokio::test]
async fn environment_overrides_defaults(isolated_home: IsolatedHome) {
    let home = isolated_home.root.as_str();
    let _guard = EnvGuard::set_vars(&[
        ("HOME", home),
        ("XDG_CONFIG_HOME", home),
        ("PROVREG_NAMESPACE", "ci-pools"),
    ])
    .await;

    let cfg = RegistryConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));

    assert_eq!(cfg.namespace, "ci-pools");
    assert_eq!(cfg.log_filter, "warn");
    assert!(cfg.validate().is_ok());
}

#[rstest]
#[tokio::test]
async fn invalid_namespace_from_environment_fails_validation(isolated_home: IsolatedHome) {
    let home = isolated_home.root.as_str();
    let _guard = EnvGuard::set_vars(&[
        ("HOME", home),
        ("XDG_CONFIG_HOME", home),
        ("PROVREG_NAMESPACE", "Fleet_Default"),
    ])
    .await;

    let cfg = RegistryConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));

    assert_eq!(
        cfg.validate(),
        Err(ConfigError::InvalidNamespace(String::from("Fleet_Default")))
    );
}

#[rstest]
#[tokio::test]
async fn inputs_are_discovered_from_environment_path(isolated_home: IsolatedHome) {
    let dir = Dir::open_ambient_dir(&isolated_home.root, ambient_authority())
        .unwrap_or_else(|err| panic!("open temp dir: {err}"));
    dir.write("custom-inputs.toml", SAMPLE_INPUTS_TOML)
        .unwrap_or_else(|err| panic!("write inputs: {err}"));
    let inputs_path = isolated_home.root.join("custom-inputs.toml");

    let home = isolated_home.root.as_str();
    let _guard = EnvGuard::set_vars(&[
        ("HOME", home),
        ("XDG_CONFIG_HOME", home),
        ("PROVREG_INPUTS_PATH", inputs_path.as_str()),
    ])
    .await;

    let cfg = RegistryConfig::load_without_cli_args()
        .unwrap_or_else(|err| panic!("config should load: {err}"));
    assert_eq!(cfg.inputs_path(), Some(inputs_path.clone()));

    let inputs = ProviderInputs::discover(None)
        .unwrap_or_else(|err| panic!("inputs should be discovered: {err}"));
    assert_eq!(inputs.aws.machine_configs.len(), 2);
    assert!(inputs.linode.credentials.is_some());
}

#[rstest]
fn explicit_inputs_path_must_exist(isolated_home: IsolatedHome) {
    let missing = isolated_home.root.join("absent.toml");
    let err = ProviderInputs::discover(Some(&missing)).expect_err("missing file should fail");
    assert!(
        err.to_string().contains("absent.toml"),
        "error should name the file: {err}"
    );
}
