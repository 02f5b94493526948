//! extrepo CLI
//!
//! Command-line access to a local extension repository: listing, install
//! state changes, backward dependencies and validation.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use extrepo_core::{LocalExtensionRepository, RepositoryConfig, logging};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to set tracing subscriber: {e}")))?;

    let repository = open_repository(&cli)?;
    execute_command(&repository, cli.command)
}

fn open_repository(cli: &Cli) -> Result<LocalExtensionRepository> {
    let mut config = match &cli.config {
        Some(path) => RepositoryConfig::load(path)?,
        None => RepositoryConfig::default(),
    };
    if let Some(root) = &cli.root {
        config = config.with_root(root);
    }
    tracing::debug!(root = %config.root.display(), "opening local extension repository");
    Ok(LocalExtensionRepository::open(&config)?)
}

fn execute_command(repository: &LocalExtensionRepository, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List {
            namespace,
            all,
            json,
        } => commands::run_list(repository, namespace.as_ref(), all, json),
        Commands::Show { id, version, json } => commands::run_show(repository, &id, &version, json),
        Commands::Install {
            id,
            version,
            namespace,
            dependency,
            kind,
            depends,
        } => commands::run_install(
            repository,
            commands::InstallRequest {
                id,
                version,
                namespace: namespace.unwrap_or_default(),
                dependency,
                kind,
                depends,
            },
        ),
        Commands::Uninstall {
            id,
            version,
            namespace,
        } => commands::run_uninstall(repository, &id, &version, &namespace.unwrap_or_default()),
        Commands::Rdeps {
            id,
            namespace,
            version,
            json,
        } => commands::run_rdeps(
            repository,
            &id,
            &namespace.unwrap_or_default(),
            version.as_deref(),
            json,
        ),
        Commands::Validate { json } => commands::run_validate(repository, json),
    }
}
