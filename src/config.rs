//! Configuration loading via `ortho-config`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const MAX_LABEL_LEN: usize = 63;

/// Registry settings derived from defaults, configuration files and
/// environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "PROVREG")]
pub struct RegistryConfig {
    /// Namespace machine-config resources are generated in. Defaults to
    /// `fleet-default`.
    #[ortho_config(default = "fleet-default".to_owned())]
    pub namespace: String,
    /// Explicit path of the provider inputs file. When unset the inputs file
    /// is discovered.
    pub inputs_path: Option<String>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[ortho_config(default = "warn".to_owned())]
    pub log_filter: String,
}

impl RegistryConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("provreg")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the configured inputs path, ignoring blank values.
    #[must_use]
    pub fn inputs_path(&self) -> Option<Utf8PathBuf> {
        self.inputs_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(Utf8PathBuf::from)
    }

    /// Performs semantic validation on the loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the namespace or log filter
    /// is empty and [`ConfigError::InvalidNamespace`] when the namespace is not
    /// a DNS-1123 label.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "missing namespace: set PROVREG_NAMESPACE or pass --namespace",
            )));
        }
        validate_namespace(&self.namespace)?;
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::MissingField(String::from(
                "missing log filter: set PROVREG_LOG_FILTER",
            )));
        }
        Ok(())
    }
}

/// Checks that `namespace` is a DNS-1123 label: lowercase alphanumerics and
/// `-`, starting and ending with an alphanumeric, at most 63 characters.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidNamespace`] naming the rejected value.
pub fn validate_namespace(namespace: &str) -> Result<(), ConfigError> {
    if is_dns_label(namespace) {
        Ok(())
    } else {
        Err(ConfigError::InvalidNamespace(namespace.to_owned()))
    }
}

/// Checks that `cluster` is a DNS-1123 label, since it is embedded in the
/// generated machine pool names.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidClusterName`] naming the rejected value.
pub fn validate_cluster_name(cluster: &str) -> Result<(), ConfigError> {
    if is_dns_label(cluster) {
        Ok(())
    } else {
        Err(ConfigError::InvalidClusterName(cluster.to_owned()))
    }
}

fn is_dns_label(value: &str) -> bool {
    let is_edge = |ch: char| ch.is_ascii_lowercase() || ch.is_ascii_digit();
    !value.is_empty()
        && value.len() <= MAX_LABEL_LEN
        && value.chars().all(|ch| is_edge(ch) || ch == '-')
        && value.starts_with(is_edge)
        && value.ends_with(is_edge)
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the namespace is not a valid DNS-1123 label.
    #[error("invalid namespace '{0}': expected a lowercase DNS-1123 label")]
    InvalidNamespace(String),
    /// Indicates the cluster name is not a valid DNS-1123 label.
    #[error("invalid cluster name '{0}': expected a lowercase DNS-1123 label")]
    InvalidClusterName(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn valid_config() -> RegistryConfig {
        RegistryConfig {
            namespace: String::from("fleet-default"),
            inputs_path: None,
            log_filter: String::from("warn"),
        }
    }

    #[rstest]
    #[case("fleet-default")]
    #[case("ns1")]
    #[case("a")]
    fn accepts_dns_labels(#[case] namespace: &str) {
        assert!(validate_namespace(namespace).is_ok());
    }

    #[rstest]
    #[case("Fleet")]
    #[case("-leading")]
    #[case("trailing-")]
    #[case("under_score")]
    #[case("")]
    fn rejects_invalid_namespaces(#[case] namespace: &str) {
        assert_eq!(
            validate_namespace(namespace),
            Err(ConfigError::InvalidNamespace(namespace.to_owned()))
        );
    }

    #[rstest]
    #[case("Demo_X")]
    #[case("demo.cluster")]
    #[case("")]
    fn rejects_invalid_cluster_names(#[case] cluster: &str) {
        assert_eq!(
            validate_cluster_name(cluster),
            Err(ConfigError::InvalidClusterName(cluster.to_owned()))
        );
    }

    #[test]
    fn accepts_cluster_label() {
        assert!(validate_cluster_name("smoke-01").is_ok());
    }

    #[test]
    fn rejects_overlong_namespace() {
        assert!(validate_namespace(&"a".repeat(MAX_LABEL_LEN + 1)).is_err());
    }

    #[rstest]
    fn validate_reports_blank_namespace_with_env_hint(valid_config: RegistryConfig) {
        let cfg = RegistryConfig {
            namespace: String::from("  "),
            ..valid_config
        };
        let err = cfg.validate().expect_err("blank namespace should fail");
        assert!(err.to_string().contains("PROVREG_NAMESPACE"), "unexpected error: {err}");
    }

    #[rstest]
    fn inputs_path_ignores_blank_values(valid_config: RegistryConfig) {
        let cfg = RegistryConfig {
            inputs_path: Some(String::from("   ")),
            ..valid_config
        };
        assert_eq!(cfg.inputs_path(), None);

        let cfg = RegistryConfig {
            inputs_path: Some(String::from("/etc/provreg/providers.toml")),
            ..cfg
        };
        assert_eq!(
            cfg.inputs_path(),
            Some(Utf8PathBuf::from("/etc/provreg/providers.toml"))
        );
    }
}
