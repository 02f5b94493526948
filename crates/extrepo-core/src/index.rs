//! In-memory index of every known extension record.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::extension::{ExtensionId, LocalExtension};

/// Versions of one id, sorted ascending.
pub type Versions = Arc<[Arc<LocalExtension>]>;

/// Registry of records by `(id, version)` and by id.
///
/// Version lists are replaced copy-on-write: a reader holding a [`Versions`]
/// keeps a consistent, sorted list while a concurrent insert publishes a new
/// one.
#[derive(Debug, Default)]
pub struct ExtensionIndex {
    extensions: RwLock<HashMap<ExtensionId, Arc<LocalExtension>>>,
    versions: RwLock<HashMap<String, Versions>>,
}

impl ExtensionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, keeping its id's version list sorted.
    ///
    /// Returns the stored record: `record` itself, or the record already
    /// registered for the same `(id, version)`, which is left untouched.
    pub fn upsert(&self, record: Arc<LocalExtension>) -> Arc<LocalExtension> {
        let mut extensions = self.extensions.write();
        if let Some(existing) = extensions.get(record.id()) {
            return Arc::clone(existing);
        }
        extensions.insert(record.id().clone(), Arc::clone(&record));

        let mut versions = self.versions.write();
        let current = versions
            .get(record.id().id())
            .map(|list| list.to_vec())
            .unwrap_or_default();
        let position =
            current.partition_point(|other| other.id().version() < record.id().version());
        let mut updated = Vec::with_capacity(current.len() + 1);
        updated.extend_from_slice(&current[..position]);
        updated.push(Arc::clone(&record));
        updated.extend_from_slice(&current[position..]);
        versions.insert(record.id().id().to_string(), Versions::from(updated));

        record
    }

    pub fn lookup(&self, id: &ExtensionId) -> Option<Arc<LocalExtension>> {
        self.extensions.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ExtensionId) -> bool {
        self.extensions.read().contains_key(id)
    }

    /// Every known version of `id`, oldest first. Empty when unknown.
    pub fn versions_of(&self, id: &str) -> Versions {
        self.versions
            .read()
            .get(id)
            .cloned()
            .unwrap_or_else(|| Versions::from(Vec::new()))
    }

    /// Every known id, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.versions.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every record, sorted by id then version.
    pub fn all(&self) -> Vec<Arc<LocalExtension>> {
        let mut all: Vec<_> = self.extensions.read().values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.read().is_empty()
    }
}
