//! Repository configuration
//!
//! A `extrepo.toml` file describes where descriptors live and which ids the
//! built-in core extension registry reports. Every key is optional:
//!
//! ```toml
//! root = "/var/lib/wiki/extensions"
//! descriptor_extension = "toml"
//! repository_id = "local"
//! core_extensions = ["org.example:platform-core"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core_extension::CoreExtensionRegistry;
use crate::error::ConfigError;

fn default_root() -> PathBuf {
    PathBuf::from("extensions")
}

fn default_descriptor_extension() -> String {
    "toml".to_string()
}

fn default_repository_id() -> String {
    "local".to_string()
}

/// Settings for a directory-backed local extension repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Folder holding one descriptor per extension version
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Descriptor file suffix, without the dot
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,

    /// Identifier reported by the repository
    #[serde(default = "default_repository_id")]
    pub repository_id: String,

    /// Ids of the core extensions bundled with the platform
    #[serde(default)]
    pub core_extensions: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            descriptor_extension: default_descriptor_extension(),
            repository_id: default_repository_id(),
            core_extensions: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// Load a configuration file under a shared lock.
    ///
    /// A relative `root` is resolved against the file's folder.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = extrepo_fs::read_locked(path)?;
        let mut config = Self::from_toml(&content)?;
        if config.root.is_relative() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }
        Ok(config)
    }

    /// Parse and check a configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use extrepo_core::RepositoryConfig;
    ///
    /// let config = RepositoryConfig::from_toml(r#"
    /// repository_id = "wiki"
    /// core_extensions = ["platform"]
    /// "#).unwrap();
    ///
    /// assert_eq!(config.repository_id, "wiki");
    /// assert_eq!(config.descriptor_extension, "toml");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: RepositoryConfig = toml::from_str(content)?;
        config.descriptor_extension = config
            .descriptor_extension
            .trim()
            .trim_start_matches('.')
            .to_string();
        config.validate()?;
        Ok(config)
    }

    /// Replace the descriptor folder.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// The core extension registry built from `core_extensions`.
    pub fn core_registry(&self) -> CoreExtensionRegistry {
        CoreExtensionRegistry::with_ids(self.core_extensions.iter().cloned())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.repository_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "repository_id".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.descriptor_extension.is_empty() {
            return Err(ConfigError::Invalid {
                key: "descriptor_extension".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(id) = self.core_extensions.iter().find(|id| id.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                key: "core_extensions".to_string(),
                reason: format!("empty id {id:?}"),
            });
        }
        Ok(())
    }
}
