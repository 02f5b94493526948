//! Local extension repository engine.
//!
//! This crate keeps the records of every locally stored extension version,
//! decides which of them are validly installed in which namespace, and
//! answers "what depends on this extension" queries.
//!
//! - [`version`]: free-form version ordering and dependency constraints
//! - [`index`]: records by `(id, version)` and sorted version lists per id
//! - [`validation`]: the installed-state validation pass
//! - [`backward`]: reverse dependency index of installed records
//! - [`repository`]: [`LocalExtensionRepository`], the public surface
//! - [`storage`]: the persistence boundary and its file and memory backends
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use extrepo_core::{
//!     CoreExtensionRegistry, DependencyReference, Extension, LocalExtensionRepository,
//!     MemoryStorage, Namespace,
//! };
//!
//! let repository = LocalExtensionRepository::with_parts(
//!     "local",
//!     Arc::new(MemoryStorage::new()),
//!     Arc::new(CoreExtensionRegistry::with_ids(["platform"])),
//! )
//! .unwrap();
//!
//! let wiki = Namespace::named("wiki1");
//! repository
//!     .install_extension(&Extension::new("macros", "1.0"), true, &wiki)
//!     .unwrap();
//! repository
//!     .install_extension(
//!         &Extension::new("blog", "2.1").with_dependency(DependencyReference::new("macros")),
//!         false,
//!         &wiki,
//!     )
//!     .unwrap();
//!
//! let dependents = repository.get_backward_dependencies("macros", &wiki).unwrap();
//! assert_eq!(dependents[0].id().id(), "blog");
//! ```

pub mod backward;
pub mod config;
pub mod core_extension;
pub mod error;
pub mod extension;
pub mod index;
pub mod logging;
pub mod namespace;
pub mod repository;
pub mod storage;
pub mod validation;
pub mod version;

pub use config::RepositoryConfig;
pub use core_extension::{CoreExtensionRegistry, CoreExtensionRepository};
pub use error::{
    ConfigError, ConstraintError, DescriptorError, Error, InstallError, ResolveError, Result,
    StorageError, UninstallError,
};
pub use extension::{DependencyReference, Extension, ExtensionId, LocalExtension};
pub use namespace::Namespace;
pub use repository::LocalExtensionRepository;
pub use storage::{
    DependencyDescriptor, ExtensionDescriptor, ExtensionStorage, FileStorage, MemoryStorage,
};
pub use validation::{DemotionReason, Demotion, DependencyCycle, ValidationReport};
pub use version::{Version, VersionConstraint};
