//! Infrastructure provider names and their canonical string forms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Infrastructure backends that can host provisioned machines.
///
/// Each variant has exactly one canonical string form, which is the key used
/// by the registries. Matching is exact and case-sensitive.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ProviderName {
    /// Amazon EC2.
    Aws,
    /// Microsoft Azure.
    Azure,
    /// DigitalOcean droplets.
    DigitalOcean,
    /// Linode (Akamai) instances.
    Linode,
    /// Harvester HCI virtual machines.
    Harvester,
    /// VMware vSphere virtual machines.
    Vsphere,
    /// Alibaba Cloud ECS instances.
    Aliyun,
}

impl ProviderName {
    /// Every supported provider in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Aws,
        Self::Azure,
        Self::DigitalOcean,
        Self::Linode,
        Self::Harvester,
        Self::Vsphere,
        Self::Aliyun,
    ];

    /// Returns the canonical string used as the lookup key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::DigitalOcean => "do",
            Self::Linode => "linode",
            Self::Harvester => "harvester",
            Self::Vsphere => "vsphere",
            Self::Aliyun => "aliyunecs",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a string does not match any canonical provider name.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown provider name: {0}")]
pub struct UnknownProviderName(pub String);

impl FromStr for ProviderName {
    type Err = UnknownProviderName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| UnknownProviderName(value.to_owned()))
    }
}

impl From<ProviderName> for &'static str {
    fn from(value: ProviderName) -> Self {
        value.as_str()
    }
}

impl TryFrom<String> for ProviderName {
    type Error = UnknownProviderName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
