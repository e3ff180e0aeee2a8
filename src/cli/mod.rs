//! Command-line interface definitions for the `gridscale` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{ArgAction, ArgGroup, Parser, Subcommand};

/// Top-level CLI for the `gridscale` binary.
#[derive(Debug, Parser)]
#[command(
    name = "gridscale",
    about = "Inspect and manage gridscale templates, servers and Kubernetes clusters",
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub(crate) verbose: u8,
    /// Command to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Resource groups handled by the CLI.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Storage templates.
    #[command(subcommand)]
    Templates(TemplateCommand),
    /// Asynchronous requests.
    #[command(subcommand)]
    Requests(RequestCommand),
    /// Servers.
    #[command(subcommand)]
    Servers(ServerCommand),
    /// Managed Kubernetes.
    #[command(subcommand)]
    K8s(K8sCommand),
}

/// Template subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum TemplateCommand {
    /// List all templates.
    List,
    /// Show a single template.
    Get {
        /// Template UUID.
        id: String,
    },
    /// Delete a template.
    Delete {
        /// Template UUID.
        id: String,
        /// Succeed when the template is already gone.
        #[arg(long)]
        ignore_missing: bool,
    },
}

/// Request subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum RequestCommand {
    /// Block until an asynchronous request reports `done`.
    Wait {
        /// Request UUID.
        id: String,
    },
}

/// Server subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum ServerCommand {
    /// Switch a server on or off and wait for the new power state.
    #[command(group(ArgGroup::new("state").required(true).args(["on", "off"])))]
    Power {
        /// Server UUID.
        id: String,
        /// Power the server on.
        #[arg(long)]
        on: bool,
        /// Power the server off.
        #[arg(long)]
        off: bool,
    },
}

/// Kubernetes subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum K8sCommand {
    /// List available Kubernetes releases and their template UUIDs.
    Releases,
}
