//! `extrepo show`

use colored::Colorize;
use extrepo_core::{ExtensionId, LocalExtensionRepository};

use super::{namespaces_label, record_json};
use crate::error::Result;

/// Run the show command
pub fn run_show(
    repository: &LocalExtensionRepository,
    id: &str,
    version: &str,
    json: bool,
) -> Result<()> {
    let record = repository.resolve(&ExtensionId::new(id, version))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record_json(&record))?);
        return Ok(());
    }

    println!("{} {}", "=>".blue().bold(), record.id().to_string().cyan().bold());
    println!("   {} {}", "Type:".dimmed(), record.kind());
    println!("   {} {}", "Installed:".dimmed(), namespaces_label(&record));
    println!(
        "   {} {}",
        "Dependency:".dimmed(),
        if record.is_dependency() { "yes" } else { "no" }
    );
    if record.dependencies().is_empty() {
        println!("   {} none", "Depends on:".dimmed());
    } else {
        println!("   {}", "Depends on:".dimmed());
        for dep in record.dependencies() {
            println!("     - {dep}");
        }
    }

    Ok(())
}
