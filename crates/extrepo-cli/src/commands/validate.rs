//! `extrepo validate`

use colored::Colorize;
use extrepo_core::{DemotionReason, LocalExtensionRepository, ValidationReport};

use crate::error::Result;

/// Run the validate command
///
/// Reports what validating the stored install state demoted at load, then
/// re-runs the pass and reports it separately; a stable state re-checks
/// with no demotions.
pub fn run_validate(repository: &LocalExtensionRepository, json: bool) -> Result<()> {
    let load = repository.load_report().clone();
    let recheck = repository.revalidate();

    if json {
        let value = serde_json::json!({
            "load": report_json(&load),
            "recheck": report_json(&recheck),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_pass("Load", &load);
    print_pass("Recheck", &recheck);
    if load.demoted.is_empty() && recheck.demoted.is_empty() {
        println!("   {}", "Installed state is consistent.".green());
    }
    Ok(())
}

fn report_json(report: &ValidationReport) -> serde_json::Value {
    serde_json::json!({
        "validated": report.validated,
        "demoted": report.demoted.iter().map(|d| serde_json::json!({
            "extension": d.extension.to_string(),
            "namespace": d.namespace.to_string(),
            "reason": reason_label(&d.reason),
        })).collect::<Vec<_>>(),
        "cycles": report.cycles.iter().map(|c| serde_json::json!({
            "dependent": c.dependent.to_string(),
            "dependency": c.dependency,
            "namespace": c.namespace.to_string(),
        })).collect::<Vec<_>>(),
    })
}

fn print_pass(label: &str, report: &ValidationReport) {
    println!(
        "{} {}: validated {} extension node(s)",
        "=>".blue().bold(),
        label,
        report.validated
    );
    for demotion in &report.demoted {
        println!(
            "   {} {} in {}: {}",
            "demoted".yellow().bold(),
            demotion.extension.to_string().cyan(),
            demotion.namespace,
            reason_label(&demotion.reason)
        );
    }
    for cycle in &report.cycles {
        println!(
            "   {} {} -> {} in {}",
            "cycle".dimmed(),
            cycle.dependent,
            cycle.dependency,
            cycle.namespace
        );
    }
}

fn reason_label(reason: &DemotionReason) -> String {
    match reason {
        DemotionReason::CoreExtension => "a core extension has the same id".to_string(),
        DemotionReason::Shadowed { by } => format!("{by} is installed instead"),
        DemotionReason::UnsatisfiedDependency { dependency } => {
            format!("dependency [{dependency}] is not available")
        }
    }
}
