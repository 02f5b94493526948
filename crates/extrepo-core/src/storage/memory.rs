//! In-memory descriptor store.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{ExtensionDescriptor, ExtensionStorage};
use crate::error::StorageError;

/// Keeps descriptors in a map keyed by `(id, version)`.
///
/// Useful for embedding and tests; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    descriptors: Mutex<BTreeMap<(String, String), ExtensionDescriptor>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `descriptors`.
    pub fn with_descriptors(descriptors: impl IntoIterator<Item = ExtensionDescriptor>) -> Self {
        let storage = Self::new();
        {
            let mut map = storage.descriptors.lock();
            for descriptor in descriptors {
                map.insert(key(&descriptor), descriptor);
            }
        }
        storage
    }

    /// The stored descriptor for `id`/`version`, if any.
    pub fn get(&self, id: &str, version: &str) -> Option<ExtensionDescriptor> {
        self.descriptors
            .lock()
            .get(&(id.to_string(), version.to_string()))
            .cloned()
    }

    /// Every stored descriptor, ordered by id then version string.
    pub fn descriptors(&self) -> Vec<ExtensionDescriptor> {
        self.descriptors.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.lock().is_empty()
    }
}

fn key(descriptor: &ExtensionDescriptor) -> (String, String) {
    (descriptor.id.clone(), descriptor.version.clone())
}

impl ExtensionStorage for MemoryStorage {
    fn load_all(&self) -> Result<Vec<Result<ExtensionDescriptor, StorageError>>, StorageError> {
        Ok(self.descriptors.lock().values().cloned().map(Ok).collect())
    }

    fn save(&self, descriptor: &ExtensionDescriptor) -> Result<(), StorageError> {
        self.descriptors
            .lock()
            .insert(key(descriptor), descriptor.clone());
        Ok(())
    }
}
