//! `extrepo install` and `extrepo uninstall`

use colored::Colorize;
use extrepo_core::{
    DependencyReference, Extension, ExtensionId, LocalExtensionRepository, Namespace,
    VersionConstraint,
};

use crate::error::{CliError, Result};

/// Arguments of the install command
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub id: String,
    pub version: String,
    pub namespace: Namespace,
    pub dependency: bool,
    pub kind: Option<String>,
    pub depends: Vec<String>,
}

/// Run the install command
pub fn run_install(repository: &LocalExtensionRepository, request: InstallRequest) -> Result<()> {
    let mut extension = Extension::new(request.id, request.version);
    if let Some(kind) = request.kind {
        extension = extension.with_kind(kind);
    }
    for raw in &request.depends {
        extension = extension.with_dependency(parse_dependency(raw)?);
    }

    let record = repository.install_extension(&extension, request.dependency, &request.namespace)?;

    println!(
        "{} Installed {} in {}",
        "=>".blue().bold(),
        record.id().to_string().cyan(),
        request.namespace.to_string().bold()
    );
    Ok(())
}

/// Run the uninstall command
pub fn run_uninstall(
    repository: &LocalExtensionRepository,
    id: &str,
    version: &str,
    namespace: &Namespace,
) -> Result<()> {
    let record = repository.resolve(&ExtensionId::new(id, version))?;
    let dependents = repository.get_backward_dependencies_of(record.id())?;

    repository.uninstall_extension(&record, namespace)?;

    println!(
        "{} Uninstalled {} from {}",
        "=>".blue().bold(),
        record.id().to_string().cyan(),
        namespace.to_string().bold()
    );
    let demoted: Vec<String> = dependents
        .iter()
        .flat_map(|(ns, records)| {
            records
                .iter()
                .filter(move |d| !d.is_installed(ns))
                .map(move |d| format!("{} ({ns})", d.id()))
        })
        .collect();
    if !demoted.is_empty() {
        println!(
            "   {} {}",
            "No longer installed:".yellow(),
            demoted.join(", ")
        );
    }
    Ok(())
}

/// Parse `id` or `id:constraint`.
///
/// Ids may contain `:` themselves, so only a last segment that looks like a
/// constraint (leading operator, digit or `*`) is split off.
fn parse_dependency(raw: &str) -> Result<DependencyReference> {
    let raw = raw.trim();
    if let Some((id, constraint)) = raw.rsplit_once(':') {
        let looks_like_constraint = constraint
            .chars()
            .next()
            .is_some_and(|c| matches!(c, '<' | '>' | '=' | '!' | '*') || c.is_ascii_digit());
        if looks_like_constraint {
            let constraint = VersionConstraint::parse(constraint)
                .map_err(|e| CliError::user(format!("invalid dependency '{raw}': {e}")))?;
            return Ok(DependencyReference::with_constraint(id, constraint));
        }
    }
    if raw.is_empty() {
        return Err(CliError::user("dependency id must not be empty"));
    }
    Ok(DependencyReference::new(raw))
}
