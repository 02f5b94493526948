//! Core extensions: bundled, immutable extensions the local repository can
//! never install over, shadow or remove.

use std::collections::HashSet;

/// Answers whether a core extension exists for an id.
pub trait CoreExtensionRepository: Send + Sync {
    fn exists(&self, id: &str) -> bool;
}

/// Fixed set of core extension ids.
#[derive(Debug, Clone, Default)]
pub struct CoreExtensionRegistry {
    ids: HashSet<String>,
}

impl CoreExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl CoreExtensionRepository for CoreExtensionRegistry {
    fn exists(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}
