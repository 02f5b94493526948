//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use extrepo_core::Namespace;

/// extrepo - Inspect and manage a local extension repository
#[derive(Parser, Debug)]
#[command(name = "extrepo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository configuration file
    #[arg(long, global = true, env = "EXTREPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Descriptor folder, overriding the configuration
    #[arg(long, global = true, env = "EXTREPO_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List extensions
    ///
    /// Without options, lists the extensions installed anywhere.
    List {
        /// Only extensions installed in this namespace ("{root}" for root)
        #[arg(short, long)]
        namespace: Option<Namespace>,

        /// Every stored extension, installed or not
        #[arg(short, long, conflicts_with = "namespace")]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one stored extension
    Show {
        /// Extension id
        id: String,

        /// Extension version
        version: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Record an extension as installed
    ///
    /// The extension content must already be in place; only its metadata is
    /// recorded.
    ///
    /// Examples:
    ///   extrepo install org.example:macros 1.2
    ///   extrepo install blog 2.0 -n wiki1 --depends org.example:macros:>=1.0
    Install {
        /// Extension id
        id: String,

        /// Extension version
        version: String,

        /// Namespace to install in (root when omitted)
        #[arg(short, long)]
        namespace: Option<Namespace>,

        /// Mark the extension as installed as a dependency
        #[arg(long)]
        dependency: bool,

        /// Extension type
        #[arg(long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Dependency as `id` or `id:constraint` (repeatable)
        #[arg(short, long = "depends", value_name = "DEPENDENCY")]
        depends: Vec<String>,
    },

    /// Record an extension as uninstalled
    Uninstall {
        /// Extension id
        id: String,

        /// Extension version
        version: String,

        /// Namespace to uninstall from (root, meaning everywhere, when omitted)
        #[arg(short, long)]
        namespace: Option<Namespace>,
    },

    /// Show the installed extensions depending on an extension
    Rdeps {
        /// Extension id
        id: String,

        /// Namespace to look in (root when omitted)
        #[arg(short, long, conflicts_with = "version")]
        namespace: Option<Namespace>,

        /// Report every namespace this version is installed in
        #[arg(long)]
        version: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Re-run the installed state validation and report demotions
    Validate {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
