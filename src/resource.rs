//! Semi-structured machine-config documents produced by pool builders.

use serde::Serialize;
use serde_json::{Map, Value};

/// API group and version shared by every machine-config resource.
pub const MACHINE_CONFIG_API_VERSION: &str = "rke-machine-config.cattle.io/v1";

/// Metadata attached to a generated machine-config resource.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorMetadata {
    /// Name prefix the orchestration API completes with a random suffix.
    pub generate_name: String,
    /// Namespace the resource is created in.
    pub namespace: String,
}

/// An untyped machine-config resource for one machine pool.
///
/// Provider specific settings are stored in `fields` and serialised at the
/// top level of the document, next to `apiVersion`, `kind` and `metadata`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// API version of the resource.
    pub api_version: String,
    /// Resource kind (for example `Amazonec2Config`).
    pub kind: String,
    /// Resource metadata.
    pub metadata: DescriptorMetadata,
    /// Provider specific machine settings.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResourceDescriptor {
    /// Creates a descriptor with no provider fields.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        generate_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            api_version: MACHINE_CONFIG_API_VERSION.to_owned(),
            kind: kind.into(),
            metadata: DescriptorMetadata {
                generate_name: generate_name.into(),
                namespace: namespace.into(),
            },
            fields: Map::new(),
        }
    }

    /// Merges the serialised form of `settings` into the descriptor fields.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when `settings` fails to serialise or
    /// does not serialise to a JSON object.
    pub fn with_fields<T: Serialize>(mut self, settings: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(settings)? {
            Value::Object(map) => {
                self.fields.extend(map);
                Ok(self)
            }
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "machine settings must serialise to an object, got {other}"
            ))),
        }
    }

    /// Returns a provider field by its serialised key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Builds the generated pool name used as the `generateName` prefix,
/// `nc-<cluster>-pool<index>-`.
#[must_use]
pub fn generate_pool_name(cluster: &str, index: usize) -> String {
    format!("nc-{cluster}-pool{index}-")
}
