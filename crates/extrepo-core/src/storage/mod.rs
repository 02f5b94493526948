//! Persistence boundary of the local repository.
//!
//! The repository reads every descriptor once when it opens and writes one
//! descriptor per state change. Anything that can do both implements
//! [`ExtensionStorage`].

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Persisted form of an extension record.
///
/// ```toml
/// id = "org.example:macros"
/// version = "1.2"
/// type = "jar"
/// installed = true
/// dependency = false
/// namespaces = ["wiki1"]   # absent: installed at root
///
/// [[dependencies]]
/// id = "org.example:rendering"
/// version = ">=1.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    pub id: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub dependency: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyDescriptor>,
}

/// Persisted form of a dependency reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    pub id: String,
    /// Version constraint; absent means any version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExtensionDescriptor {
    /// Parse a descriptor from TOML.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize a descriptor to TOML.
    pub fn to_toml(&self) -> Result<String, StorageError> {
        toml::to_string_pretty(self).map_err(|e| StorageError::Serialize {
            id: self.id.clone(),
            message: e.to_string(),
        })
    }
}

/// Durable store of extension descriptors.
pub trait ExtensionStorage: Send + Sync {
    /// Read every stored descriptor.
    ///
    /// The outer error means the store itself is unreadable. Inner errors
    /// are per descriptor: the repository logs and skips those.
    fn load_all(&self) -> Result<Vec<Result<ExtensionDescriptor, StorageError>>, StorageError>;

    /// Create or replace the descriptor for `descriptor.id`/`descriptor.version`.
    fn save(&self, descriptor: &ExtensionDescriptor) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minimal_descriptor_uses_defaults() {
        let d = ExtensionDescriptor::from_toml(
            r#"
id = "a"
version = "1.0"
"#,
        )
        .unwrap();
        assert_eq!(d.kind, "");
        assert!(!d.installed);
        assert!(!d.dependency);
        assert_eq!(d.namespaces, None);
        assert!(d.dependencies.is_empty());
    }

    #[test]
    fn full_descriptor_parses() {
        let d = ExtensionDescriptor::from_toml(
            r#"
id = "org.example:macros"
version = "1.2"
type = "xar"
installed = true
dependency = true
namespaces = ["wiki1", "wiki2"]

[[dependencies]]
id = "org.example:rendering"
version = ">=1.0"

[[dependencies]]
id = "org.example:model"
"#,
        )
        .unwrap();
        assert_eq!(d.kind, "xar");
        assert_eq!(
            d.namespaces,
            Some(vec!["wiki1".to_string(), "wiki2".to_string()])
        );
        assert_eq!(d.dependencies.len(), 2);
        assert_eq!(d.dependencies[1].version, None);
    }

    #[test]
    fn serialized_descriptor_omits_root_namespaces() {
        let d = ExtensionDescriptor {
            id: "a".to_string(),
            version: "1.0".to_string(),
            kind: "jar".to_string(),
            installed: true,
            dependency: false,
            namespaces: None,
            dependencies: vec![DependencyDescriptor {
                id: "b".to_string(),
                version: None,
            }],
        };
        let toml = d.to_toml().unwrap();
        assert!(!toml.contains("namespaces"), "{toml}");
        assert!(toml.contains("type = \"jar\""), "{toml}");
        assert_eq!(ExtensionDescriptor::from_toml(&toml).unwrap(), d);
    }
}
