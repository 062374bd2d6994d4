//! Command-line interface definitions for the `provreg` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Parser, Subcommand};

/// Top-level CLI for the `provreg` binary.
#[derive(Debug, Parser)]
#[command(
    name = "provreg",
    about = "Resolve infrastructure providers to their provisioning factories",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Read provider inputs from this file instead of discovering one.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) inputs: Option<String>,
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Subcommands of the `provreg` binary.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List the providers a registry knows.
    #[command(name = "list")]
    List {
        /// List the legacy (RKE1) registry instead.
        #[arg(long)]
        legacy: bool,
    },
    /// Describe a provider's provisioning bundle.
    #[command(name = "show")]
    Show {
        /// Canonical provider name (for example `aws` or `do`).
        name: String,
    },
    /// Print the machine-config resources of a provider's pools.
    #[command(name = "machine-pools")]
    MachinePools {
        /// Canonical provider name.
        name: String,
        /// Cluster the pools belong to.
        #[arg(long)]
        cluster: String,
        /// Pool index used in the generated pool name.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Namespace for the resources; defaults to the configured namespace.
        #[arg(long)]
        namespace: Option<String>,
    },
    /// Dry-run the creation of a provider's cloud credential.
    #[command(name = "cloud-credential")]
    CloudCredential {
        /// Canonical provider name.
        name: String,
    },
    /// Dry-run the creation of a provider's legacy node template.
    #[command(name = "node-template")]
    NodeTemplate {
        /// Canonical provider name.
        name: String,
    },
}
