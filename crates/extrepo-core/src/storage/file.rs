//! Directory-of-descriptors store.

use std::path::{Path, PathBuf};

use super::{ExtensionDescriptor, ExtensionStorage};
use crate::error::StorageError;

/// Stores one TOML descriptor per extension version under a root folder.
///
/// Descriptor files are named after the URL-encoded `id-version` pair so
/// ids containing `:` or `/` stay valid file names.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    extension: String,
}

impl FileStorage {
    /// Store descriptors under `root` with the given file suffix.
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// The repository folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the descriptor file for `id`/`version`.
    pub fn descriptor_path(&self, id: &str, version: &str) -> PathBuf {
        let name = format!("{id}-{version}");
        self.root
            .join(format!("{}.{}", urlencoding::encode(&name), self.extension))
    }

    fn load_descriptor(&self, path: &Path) -> Result<ExtensionDescriptor, StorageError> {
        let content = extrepo_fs::read_locked(path)?;
        ExtensionDescriptor::from_toml(&content).map_err(|e| StorageError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl ExtensionStorage for FileStorage {
    fn load_all(&self) -> Result<Vec<Result<ExtensionDescriptor, StorageError>>, StorageError> {
        if extrepo_fs::ensure_dir(&self.root)? {
            tracing::info!(root = %self.root.display(), "created local extension repository folder");
            return Ok(Vec::new());
        }

        let files = extrepo_fs::list_files_with_extension(&self.root, &self.extension)?;
        tracing::debug!(
            root = %self.root.display(),
            count = files.len(),
            "reading extension descriptors"
        );

        Ok(files
            .iter()
            .map(|path| self.load_descriptor(path))
            .collect())
    }

    fn save(&self, descriptor: &ExtensionDescriptor) -> Result<(), StorageError> {
        let content = descriptor.to_toml()?;
        let path = self.descriptor_path(&descriptor.id, &descriptor.version);
        extrepo_fs::write_atomic(&path, content.as_bytes())?;
        tracing::debug!(path = %path.display(), "saved extension descriptor");
        Ok(())
    }
}
