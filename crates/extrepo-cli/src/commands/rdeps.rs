//! `extrepo rdeps`

use std::collections::BTreeMap;
use std::sync::Arc;

use colored::Colorize;
use extrepo_core::{ExtensionId, LocalExtension, LocalExtensionRepository, Namespace};

use super::record_json;
use crate::error::Result;

/// Run the backward dependencies command
pub fn run_rdeps(
    repository: &LocalExtensionRepository,
    id: &str,
    namespace: &Namespace,
    version: Option<&str>,
    json: bool,
) -> Result<()> {
    let by_namespace: BTreeMap<Namespace, Vec<Arc<LocalExtension>>> = match version {
        Some(version) => repository.get_backward_dependencies_of(&ExtensionId::new(id, version))?,
        None => BTreeMap::from([(
            namespace.clone(),
            repository.get_backward_dependencies(id, namespace)?,
        )]),
    };

    if json {
        let entries: serde_json::Map<String, serde_json::Value> = by_namespace
            .iter()
            .map(|(ns, records)| {
                (
                    ns.to_string(),
                    serde_json::Value::Array(records.iter().map(|r| record_json(r)).collect()),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let target = match version {
        Some(version) => format!("{id}/{version}"),
        None => id.to_string(),
    };
    println!(
        "{} Extensions depending on {}",
        "=>".blue().bold(),
        target.cyan()
    );
    if by_namespace.values().all(Vec::is_empty) {
        println!("   None.");
    }
    for (ns, records) in &by_namespace {
        if records.is_empty() {
            continue;
        }
        println!("   {}", ns.to_string().bold());
        for record in records {
            println!("     - {}", record.id());
        }
    }
    Ok(())
}
