//! Reverse dependency index of installed extensions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::extension::{ExtensionId, LocalExtension};
use crate::namespace::Namespace;

type Dependents = BTreeMap<ExtensionId, Arc<LocalExtension>>;

/// dependency id -> namespace -> installed records declaring that dependency.
///
/// Only installed records are registered; the repository keeps this map the
/// exact inverse of the installed records' dependency lists.
#[derive(Debug, Default)]
pub struct BackwardDependencies {
    map: RwLock<HashMap<String, HashMap<Namespace, Dependents>>>,
}

impl BackwardDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `record` as a dependent of each of its dependencies in
    /// `namespace`. Registering twice is a no-op.
    pub fn register(&self, record: &Arc<LocalExtension>, namespace: &Namespace) {
        let mut map = self.map.write();
        for dependency in record.dependencies() {
            map.entry(dependency.id().to_string())
                .or_default()
                .entry(namespace.clone())
                .or_default()
                .insert(record.id().clone(), Arc::clone(record));
        }
    }

    /// Remove `record`'s edges in `namespace` only.
    pub fn unregister(&self, record: &LocalExtension, namespace: &Namespace) {
        let mut map = self.map.write();
        for dependency in record.dependencies() {
            let Some(namespaces) = map.get_mut(dependency.id()) else {
                continue;
            };
            if let Some(dependents) = namespaces.get_mut(namespace) {
                dependents.remove(record.id());
                if dependents.is_empty() {
                    namespaces.remove(namespace);
                }
            }
            if namespaces.is_empty() {
                map.remove(dependency.id());
            }
        }
    }

    /// Records depending on `id` within exactly `namespace`, sorted by id.
    pub fn query(&self, id: &str, namespace: &Namespace) -> Vec<Arc<LocalExtension>> {
        self.map
            .read()
            .get(id)
            .and_then(|namespaces| namespaces.get(namespace))
            .map(|dependents| dependents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Records depending on `id`, per namespace.
    pub fn query_all(&self, id: &str) -> BTreeMap<Namespace, Vec<Arc<LocalExtension>>> {
        self.map
            .read()
            .get(id)
            .map(|namespaces| {
                namespaces
                    .iter()
                    .map(|(ns, dependents)| (ns.clone(), dependents.values().cloned().collect()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drop every edge.
    pub fn clear(&self) {
        self.map.write().clear();
    }

    /// Total number of `(dependency, namespace, dependent)` edges.
    pub fn edge_count(&self) -> usize {
        self.map
            .read()
            .values()
            .flat_map(HashMap::values)
            .map(BTreeMap::len)
            .sum()
    }
}
