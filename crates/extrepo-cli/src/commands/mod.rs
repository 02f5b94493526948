//! Command implementations for extrepo-cli

pub mod install;
pub mod list;
pub mod rdeps;
pub mod show;
pub mod validate;

pub use install::{InstallRequest, run_install, run_uninstall};
pub use list::run_list;
pub use rdeps::run_rdeps;
pub use show::run_show;
pub use validate::run_validate;

use extrepo_core::LocalExtension;

/// JSON form of a record, shared by the listing commands.
pub(crate) fn record_json(record: &LocalExtension) -> serde_json::Value {
    serde_json::json!({
        "id": record.id().id(),
        "version": record.id().version().as_str(),
        "type": record.kind(),
        "dependency": record.is_dependency(),
        "namespaces": record
            .installed_namespaces()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        "dependencies": record
            .dependencies()
            .iter()
            .map(|dep| serde_json::json!({
                "id": dep.id(),
                "version": (!dep.version_constraint().is_any()).then(|| dep.version_constraint().as_str()),
            }))
            .collect::<Vec<_>>(),
    })
}

/// One-line summary of where a record is installed.
pub(crate) fn namespaces_label(record: &LocalExtension) -> String {
    let namespaces = record.installed_namespaces();
    if namespaces.is_empty() {
        "not installed".to_string()
    } else {
        namespaces
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
