//! Error types for extrepo-core
//!
//! Each public operation of the repository has its own error type so callers
//! can match on exactly what that operation may fail with. [`Error`] wraps
//! them all for code that does not care which step failed.

use std::path::PathBuf;

use crate::extension::ExtensionId;
use crate::namespace::Namespace;

/// Result type for extrepo-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid dependency version constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version constraint '{constraint}': {reason}")]
pub struct ConstraintError {
    pub constraint: String,
    pub reason: String,
}

/// A requested extension is unknown or not installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No record exists for this `(id, version)` pair.
    #[error("can't find extension [{0}]")]
    NotFound(ExtensionId),

    /// Records exist for the id, but none is installed in the namespace.
    #[error("extension [{id}] is not installed in namespace [{namespace}]")]
    NotInstalled { id: String, namespace: Namespace },
}

/// Failure of `install_extension`.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Core extensions can never be installed over.
    #[error("there is already a core extension with the id [{0}]")]
    CoreExtension(String),

    /// Another version of the same id is installed where this one would go.
    #[error(
        "cannot install [{requested}] in namespace [{namespace}]: [{installed}] is already installed"
    )]
    VersionConflict {
        requested: ExtensionId,
        installed: ExtensionId,
        namespace: Namespace,
    },

    /// A dependency is neither installed nor provided by a core extension.
    #[error(
        "cannot install [{extension}] in namespace [{namespace}]: dependency [{dependency}] is not available"
    )]
    UnsatisfiedDependency {
        extension: ExtensionId,
        dependency: String,
        namespace: Namespace,
    },

    /// The extension metadata cannot be turned into a record.
    #[error(transparent)]
    Invalid(#[from] DescriptorError),

    /// The in-memory state was updated but persisting it failed.
    ///
    /// The change is NOT rolled back: memory and storage disagree until the
    /// next successful save of this record or the next reload.
    #[error("failed to save extension [{extension}] descriptor: {source}")]
    Storage {
        extension: ExtensionId,
        #[source]
        source: StorageError,
    },
}

/// Failure of `uninstall_extension`.
#[derive(Debug, thiserror::Error)]
pub enum UninstallError {
    /// The in-memory state was updated but persisting it failed.
    ///
    /// The change is NOT rolled back, see [`InstallError::Storage`].
    #[error("failed to modify extension [{extension}] descriptor: {source}")]
    Storage {
        extension: ExtensionId,
        #[source]
        source: StorageError,
    },
}

/// A descriptor that cannot become an extension record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("extension id must not be empty")]
    EmptyId,

    #[error("extension [{id}] has an empty version")]
    EmptyVersion { id: String },

    #[error("extension [{id}] declares a dependency with an empty id")]
    EmptyDependencyId { id: String },

    #[error("extension [{id}] depends on itself")]
    SelfDependency { id: String },

    #[error("extension [{id}]: {source}")]
    Constraint {
        id: String,
        #[source]
        source: ConstraintError,
    },
}

/// Failures at the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem error from extrepo-fs
    #[error(transparent)]
    Fs(#[from] extrepo_fs::Error),

    /// A stored descriptor could not be parsed.
    #[error("failed to parse descriptor at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A record could not be serialized.
    #[error("failed to serialize descriptor for [{id}]: {message}")]
    Serialize { id: String, message: String },

    /// A parsed descriptor is not a valid extension record.
    #[error("invalid descriptor at {origin}: {source}")]
    Invalid {
        origin: String,
        #[source]
        source: DescriptorError,
    },

    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures loading the repository configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Filesystem error from extrepo-fs
    #[error(transparent)]
    Fs(#[from] extrepo_fs::Error),

    /// TOML deserialization error
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("invalid configuration value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Any error raised by extrepo-core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Uninstall(#[from] UninstallError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
