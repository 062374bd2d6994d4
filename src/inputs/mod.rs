//! Provider inputs file: credentials, machine pools and node templates per
//! provider.
//!
//! The file is TOML with one table per provider, keyed by the names used in
//! [`ProviderInputs`]. Keys inside a provider table are camelCase so machine
//! settings read the same as the resources they end up in.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use ortho_config::ConfigDiscovery;
use ortho_config::toml;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::provider::ProviderName;
use crate::providers::{
    AliyunSection, AwsSection, AzureSection, DigitalOceanSection, HarvesterSection, LinodeSection,
    ProviderSection, VsphereSection,
};

const APP_NAME: &str = "provreg";
const INPUTS_ENV_VAR: &str = "PROVREG_INPUTS_PATH";
const INPUTS_FILE_NAME: &str = "providers.toml";
const INPUTS_DOTFILE_NAME: &str = ".providers.toml";
const INLINE_SOURCE: &str = "<inline>";

/// Errors raised while loading provider inputs.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum InputsError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when the TOML content cannot be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a machine pool carries an invalid role combination.
    #[error("{provider} machine pool {index} is invalid: {message}")]
    InvalidPool {
        /// Provider owning the pool.
        provider: ProviderName,
        /// Position of the pool in `machineConfigs`.
        index: usize,
        /// Reason the pool was rejected.
        message: String,
    },
    /// Raised when a provider table holds a section it cannot use.
    #[error("{provider} does not support a {section} section")]
    UnsupportedSection {
        /// Provider owning the section.
        provider: ProviderName,
        /// Offending section.
        section: &'static str,
    },
}

/// Inputs for every provider. Absent tables fall back to empty sections.
///
/// Tables are keyed by the canonical provider name except for two spelled
/// out forms: `digitalocean` (also accepted as `do`) and `aliyun` (also
/// accepted as `aliyunecs`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderInputs {
    /// Amazon EC2.
    pub aws: AwsSection,
    /// Microsoft Azure.
    pub azure: AzureSection,
    /// DigitalOcean.
    #[serde(alias = "do")]
    pub digitalocean: DigitalOceanSection,
    /// Linode.
    pub linode: LinodeSection,
    /// Harvester.
    pub harvester: HarvesterSection,
    /// VMware vSphere.
    pub vsphere: VsphereSection,
    /// Alibaba Cloud ECS.
    #[serde(alias = "aliyunecs")]
    pub aliyun: AliyunSection,
}

impl ProviderInputs {
    /// Parses and validates inputs from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`InputsError::Parse`] for malformed TOML and the validation
    /// errors of [`Self::validate`].
    pub fn from_toml_str(contents: &str) -> Result<Self, InputsError> {
        parse_inputs(Utf8Path::new(INLINE_SOURCE), contents)
    }

    /// Reads, parses and validates the inputs file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InputsError::Io`] when the file cannot be read, otherwise the
    /// errors of [`Self::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, InputsError> {
        let contents = read_inputs(path)?;
        debug!(%path, "loaded provider inputs");
        parse_inputs(path, &contents)
    }

    /// Loads inputs from `explicit` when given, otherwise from the first
    /// existing discovery candidate (`PROVREG_INPUTS_PATH`, then the user and
    /// project `providers.toml` locations). Returns empty inputs when no file
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::load`].
    pub fn discover(explicit: Option<&Utf8Path>) -> Result<Self, InputsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Self::discover_with(&default_discovery())
    }

    /// Loads inputs from the first existing candidate of `discovery`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::load`].
    pub fn discover_with(discovery: &ConfigDiscovery) -> Result<Self, InputsError> {
        for candidate in discovery.utf8_candidates() {
            if path_exists(&candidate)? {
                return Self::load(&candidate);
            }
        }
        debug!("no provider inputs file found; using defaults");
        Ok(Self::default())
    }

    /// Checks every provider's pools and rejects sections a provider cannot
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`InputsError::InvalidPool`] for a pool without a usable role
    /// combination or without machines, and [`InputsError::UnsupportedSection`] when DigitalOcean
    /// carries a node template.
    pub fn validate(&self) -> Result<(), InputsError> {
        check_pools(ProviderName::Aws, &self.aws)?;
        check_pools(ProviderName::Azure, &self.azure)?;
        check_pools(ProviderName::DigitalOcean, &self.digitalocean)?;
        check_pools(ProviderName::Linode, &self.linode)?;
        check_pools(ProviderName::Harvester, &self.harvester)?;
        check_pools(ProviderName::Vsphere, &self.vsphere)?;
        check_pools(ProviderName::Aliyun, &self.aliyun)?;

        if self.digitalocean.node_template.is_some() {
            return Err(InputsError::UnsupportedSection {
                provider: ProviderName::DigitalOcean,
                section: "nodeTemplate",
            });
        }
        Ok(())
    }
}

/// Discovery settings used when no explicit inputs path is given.
#[must_use]
pub fn default_discovery() -> ConfigDiscovery {
    ConfigDiscovery::builder(APP_NAME)
        .env_var(INPUTS_ENV_VAR)
        .config_file_name(INPUTS_FILE_NAME)
        .dotfile_name(INPUTS_DOTFILE_NAME)
        .project_file_name(INPUTS_FILE_NAME)
        .build()
}

fn check_pools<C, M>(
    provider: ProviderName,
    section: &ProviderSection<C, M>,
) -> Result<(), InputsError> {
    section
        .validate_pools()
        .map_err(|(index, message)| InputsError::InvalidPool {
            provider,
            index,
            message,
        })
}

fn parse_inputs(path: &Utf8Path, contents: &str) -> Result<ProviderInputs, InputsError> {
    if contents.trim().is_empty() {
        return Ok(ProviderInputs::default());
    }

    let inputs: ProviderInputs = toml::from_str(contents).map_err(|err| InputsError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    inputs.validate()?;
    Ok(inputs)
}

fn split_path(path: &Utf8Path) -> Result<(&Utf8Path, &str), InputsError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| InputsError::Io {
        path: path.to_path_buf(),
        message: String::from("inputs path is missing a filename"),
    })?;
    Ok((parent, file_name))
}

fn path_exists(path: &Utf8Path) -> Result<bool, InputsError> {
    let (parent, file_name) = split_path(path)?;
    match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir.try_exists(file_name).map_err(|err| InputsError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(InputsError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

fn read_inputs(path: &Utf8Path) -> Result<String, InputsError> {
    let (parent, file_name) = split_path(path)?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| InputsError::Io {
        path: parent.to_path_buf(),
        message: err.to_string(),
    })?;

    dir.read_to_string(file_name).map_err(|err| InputsError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}
