//! Node roles assigned to machine pools.

use serde::{Deserialize, Serialize};

/// A functional designation carried by the nodes of a pool.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineRole {
    /// Runs the etcd datastore.
    Etcd,
    /// Runs the Kubernetes control plane.
    ControlPlane,
    /// Runs workloads.
    Worker,
    /// Windows worker node.
    Windows,
}

/// Roles and size of one machine pool.
///
/// Omitted role flags are off and an omitted quantity is one machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRoles {
    /// Pool nodes run etcd.
    #[serde(default)]
    pub etcd: bool,
    /// Pool nodes run the control plane.
    #[serde(default)]
    pub control_plane: bool,
    /// Pool nodes accept workloads.
    #[serde(default)]
    pub worker: bool,
    /// Pool nodes run Windows.
    #[serde(default)]
    pub windows: bool,
    /// Number of machines in the pool.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl PoolRoles {
    /// A single node carrying every Linux role.
    #[must_use]
    pub const fn all_in_one() -> Self {
        Self {
            etcd: true,
            control_plane: true,
            worker: true,
            windows: false,
            quantity: 1,
        }
    }

    /// Lists the roles enabled on this pool in a stable order.
    #[must_use]
    pub fn roles(&self) -> Vec<MachineRole> {
        [
            (self.etcd, MachineRole::Etcd),
            (self.control_plane, MachineRole::ControlPlane),
            (self.worker, MachineRole::Worker),
            (self.windows, MachineRole::Windows),
        ]
        .into_iter()
        .filter_map(|(enabled, role)| enabled.then_some(role))
        .collect()
    }

    /// Checks that the pool carries a usable role combination.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when no role is selected, when
    /// the pool has no machines, or when a Windows pool asks for anything
    /// other than the worker role.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.etcd || self.control_plane || self.worker) {
            return Err(String::from("pool must enable at least one role"));
        }
        if self.quantity == 0 {
            return Err(String::from("pool quantity must be at least 1"));
        }
        if self.windows && (self.etcd || self.control_plane || !self.worker) {
            return Err(String::from("windows pools may only run the worker role"));
        }
        Ok(())
    }
}

impl Default for PoolRoles {
    fn default() -> Self {
        Self {
            etcd: false,
            control_plane: false,
            worker: false,
            windows: false,
            quantity: default_quantity(),
        }
    }
}
