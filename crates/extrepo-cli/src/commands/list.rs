//! `extrepo list`

use colored::Colorize;
use extrepo_core::{LocalExtensionRepository, Namespace};

use super::{namespaces_label, record_json};
use crate::error::Result;

/// Run the list command
pub fn run_list(
    repository: &LocalExtensionRepository,
    namespace: Option<&Namespace>,
    all: bool,
    json: bool,
) -> Result<()> {
    let records = if all {
        repository.local_extensions()
    } else {
        repository.installed_extensions(namespace)
    };

    if json {
        let entries: Vec<_> = records.iter().map(|r| record_json(r)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let title = match (all, namespace) {
        (true, _) => "Stored extensions".to_string(),
        (false, Some(namespace)) => format!("Extensions installed in {namespace}"),
        (false, None) => "Installed extensions".to_string(),
    };
    println!(
        "{} {} ({} of {} in '{}')",
        "=>".blue().bold(),
        title.bold(),
        records.len(),
        repository.count_extensions(),
        repository.repository_id()
    );

    if records.is_empty() {
        println!("   No extensions.");
    }
    for record in &records {
        let mut line = format!(
            "   {} {} [{}]",
            record.id().id().cyan(),
            record.id().version(),
            record.kind()
        );
        if record.is_dependency() {
            line.push_str(&format!(" {}", "(dependency)".dimmed()));
        }
        println!("{line} {}", namespaces_label(record).dimmed());
    }

    Ok(())
}
