//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Shared values live under `tests/common/` and are pulled in with:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Machine-config resource type of AWS pools.
pub const AWS_RESOURCE_TYPE: &str = "rke-machine-config.cattle.io.amazonec2config";

/// Canonical provider names in registry order.
pub const CANONICAL_NAMES: [&str; 7] = [
    "aws",
    "azure",
    "do",
    "linode",
    "harvester",
    "vsphere",
    "aliyunecs",
];

