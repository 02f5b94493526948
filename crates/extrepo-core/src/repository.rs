//! The local extension repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::backward::BackwardDependencies;
use crate::config::RepositoryConfig;
use crate::core_extension::CoreExtensionRepository;
use crate::error::{InstallError, ResolveError, StorageError, UninstallError};
use crate::extension::{Extension, ExtensionId, LocalExtension};
use crate::index::{ExtensionIndex, Versions};
use crate::namespace::Namespace;
use crate::storage::{ExtensionStorage, FileStorage};
use crate::validation::{self, ValidationReport, Validator};

/// Records of every locally stored extension and where they are installed.
///
/// The repository owns the extension index and the backward dependency
/// index. It loads every descriptor from its [`ExtensionStorage`] once, runs
/// a validation pass, and from then on keeps both indexes consistent through
/// [`install_extension`](Self::install_extension) and
/// [`uninstall_extension`](Self::uninstall_extension).
///
/// Queries take read locks only and may run concurrently with mutations.
/// Mutations are serialized while they decide and update memory; the
/// descriptor is saved after that lock is released.
pub struct LocalExtensionRepository {
    repository_id: String,
    storage: Arc<dyn ExtensionStorage>,
    core: Arc<dyn CoreExtensionRepository>,
    index: ExtensionIndex,
    backward: BackwardDependencies,
    operations: Mutex<()>,
    load_report: ValidationReport,
}

impl std::fmt::Debug for LocalExtensionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalExtensionRepository")
            .field("repository_id", &self.repository_id)
            .field("extensions", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl LocalExtensionRepository {
    /// Open the directory-backed repository described by `config`.
    pub fn open(config: &RepositoryConfig) -> Result<Self, StorageError> {
        let storage = FileStorage::new(&config.root, &config.descriptor_extension);
        Self::with_parts(
            config.repository_id.clone(),
            Arc::new(storage),
            Arc::new(config.core_registry()),
        )
    }

    /// Build a repository over explicit collaborators and load it.
    ///
    /// Only a failure to enumerate the store is fatal. Descriptors that
    /// cannot be read or turned into a record are logged and skipped.
    pub fn with_parts(
        repository_id: impl Into<String>,
        storage: Arc<dyn ExtensionStorage>,
        core: Arc<dyn CoreExtensionRepository>,
    ) -> Result<Self, StorageError> {
        let mut repository = Self {
            repository_id: repository_id.into(),
            storage,
            core,
            index: ExtensionIndex::new(),
            backward: BackwardDependencies::new(),
            operations: Mutex::new(()),
            load_report: ValidationReport::default(),
        };
        repository.load_report = repository.load()?;
        Ok(repository)
    }

    fn load(&self) -> Result<ValidationReport, StorageError> {
        let mut skipped = 0usize;

        for entry in self.storage.load_all()? {
            let descriptor = match entry {
                Ok(descriptor) => descriptor,
                Err(error) => {
                    warn!(error = %error, "skipping unreadable extension descriptor");
                    skipped += 1;
                    continue;
                }
            };

            let record = match LocalExtension::from_descriptor(&descriptor) {
                Ok(record) => Arc::new(record),
                Err(source) => {
                    let error = StorageError::Invalid {
                        origin: format!("{}/{}", descriptor.id, descriptor.version),
                        source,
                    };
                    warn!(error = %error, "skipping invalid extension descriptor");
                    skipped += 1;
                    continue;
                }
            };

            let stored = self.index.upsert(Arc::clone(&record));
            if !Arc::ptr_eq(&stored, &record) {
                warn!(extension = %record.id(), "ignoring duplicate extension descriptor");
                skipped += 1;
            }
        }

        let report = Validator::new(&self.index, &self.backward, self.core.as_ref()).sweep();

        info!(
            repository = %self.repository_id,
            extensions = self.index.len(),
            skipped,
            demoted = report.demoted.len(),
            cycles = report.cycles.len(),
            "loaded local extension repository"
        );
        Ok(report)
    }

    /// Outcome of the validation pass run when the repository was loaded.
    pub fn load_report(&self) -> &ValidationReport {
        &self.load_report
    }

    /// The configured repository identifier.
    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    /// The stored record for `id`, installed or not.
    pub fn resolve(&self, id: &ExtensionId) -> Result<Arc<LocalExtension>, ResolveError> {
        self.index
            .lookup(id)
            .ok_or_else(|| ResolveError::NotFound(id.clone()))
    }

    pub fn exists(&self, id: &ExtensionId) -> bool {
        self.index.contains(id)
    }

    /// Number of known records, installed or not.
    pub fn count_extensions(&self) -> usize {
        self.index.len()
    }

    /// Every known record, sorted by id then version.
    pub fn local_extensions(&self) -> Vec<Arc<LocalExtension>> {
        self.index.all()
    }

    /// Every known version of `id`, oldest first.
    pub fn versions_of(&self, id: &str) -> Versions {
        self.index.versions_of(id)
    }

    /// Installed records, sorted by id then version.
    ///
    /// With `None`, records installed anywhere. With a namespace, records
    /// installed in it, root installs included.
    pub fn installed_extensions(&self, namespace: Option<&Namespace>) -> Vec<Arc<LocalExtension>> {
        self.index
            .all()
            .into_iter()
            .filter(|record| match namespace {
                None => record.is_installed_anywhere(),
                Some(namespace) => record.is_installed(namespace),
            })
            .collect()
    }

    /// The record of `id` installed in `namespace`, if any.
    pub fn installed_extension(&self, id: &str, namespace: &Namespace) -> Option<Arc<LocalExtension>> {
        validation::installed_record(&self.index, id, namespace)
    }

    /// Installed records depending on `id` in `namespace`, root installs
    /// included, sorted by id then version.
    ///
    /// Fails when no version of `id` is installed in `namespace`.
    pub fn get_backward_dependencies(
        &self,
        id: &str,
        namespace: &Namespace,
    ) -> Result<Vec<Arc<LocalExtension>>, ResolveError> {
        if self.installed_extension(id, namespace).is_none() {
            return Err(ResolveError::NotInstalled {
                id: id.to_string(),
                namespace: namespace.clone(),
            });
        }

        let mut dependents: BTreeMap<ExtensionId, Arc<LocalExtension>> = self
            .backward
            .query(id, namespace)
            .into_iter()
            .map(|record| (record.id().clone(), record))
            .collect();
        if !namespace.is_root() {
            for record in self.backward.query(id, &Namespace::Root) {
                dependents.insert(record.id().clone(), record);
            }
        }
        Ok(dependents.into_values().collect())
    }

    /// Installed records depending on the given record, per namespace it is
    /// installed in. Empty when the record is not installed.
    pub fn get_backward_dependencies_of(
        &self,
        id: &ExtensionId,
    ) -> Result<BTreeMap<Namespace, Vec<Arc<LocalExtension>>>, ResolveError> {
        let record = self.resolve(id)?;
        let namespaces = record.installed_namespaces();

        if namespaces.contains(&Namespace::Root) {
            return Ok(self.backward.query_all(id.id()));
        }

        Ok(namespaces
            .into_iter()
            .filter_map(|namespace| {
                let dependents = self.backward.query(id.id(), &namespace);
                (!dependents.is_empty()).then_some((namespace, dependents))
            })
            .collect())
    }

    /// Install `extension` in `namespace`.
    ///
    /// An extension already installed there is returned unchanged. A new
    /// record remembers `as_dependency`; an existing record keeps the flag it
    /// was created with.
    ///
    /// # Errors
    ///
    /// - [`InstallError::CoreExtension`] when a core extension owns the id
    /// - [`InstallError::VersionConflict`] when another version is installed
    ///   in `namespace` or at root, or anywhere when installing at root
    /// - [`InstallError::UnsatisfiedDependency`] when a dependency is neither
    ///   installed in `namespace` (or root) nor a core extension
    /// - [`InstallError::Storage`] when saving fails; memory keeps the change
    pub fn install_extension(
        &self,
        extension: &Extension,
        as_dependency: bool,
        namespace: &Namespace,
    ) -> Result<Arc<LocalExtension>, InstallError> {
        let id = &extension.id;
        if self.core.exists(id.id()) {
            return Err(InstallError::CoreExtension(id.id().to_string()));
        }

        let record = {
            let _operation = self.operations.lock();

            let record = match self.index.lookup(id) {
                Some(record) => record,
                None => Arc::new(LocalExtension::create(extension, as_dependency)?),
            };
            if record.is_installed(namespace) {
                debug!(extension = %id, namespace = %namespace, "extension already installed");
                return Ok(record);
            }

            if let Some(installed) = self.conflicting_install(id, namespace) {
                return Err(InstallError::VersionConflict {
                    requested: id.clone(),
                    installed: installed.id().clone(),
                    namespace: namespace.clone(),
                });
            }
            if let Some(dependency) =
                validation::unsatisfied_dependency(&self.index, self.core.as_ref(), &record, namespace)
            {
                return Err(InstallError::UnsatisfiedDependency {
                    extension: id.clone(),
                    dependency: dependency.id().to_string(),
                    namespace: namespace.clone(),
                });
            }
            self.check_constraints(&record, namespace);

            let previous = record.installed_namespaces();
            record.set_installed(true, namespace);
            let record = self.index.upsert(record);

            // A root install replaces the named ones.
            if namespace.is_root() {
                for named in previous.iter().filter(|ns| !ns.is_root()) {
                    self.backward.unregister(&record, named);
                }
            }
            self.backward.register(&record, namespace);
            record
        };

        self.persist(&record).map_err(|source| InstallError::Storage {
            extension: id.clone(),
            source,
        })?;

        info!(extension = %id, namespace = %namespace, "installed extension");
        Ok(record)
    }

    /// Uninstall `record` from `namespace`; root removes it everywhere.
    ///
    /// Does nothing when `record` is not the repository's record for its
    /// `(id, version)` or is not installed in exactly `namespace`. Dependents
    /// left without a provider are demoted in memory, transitively.
    ///
    /// # Errors
    ///
    /// [`UninstallError::Storage`] when saving fails; memory keeps the change.
    pub fn uninstall_extension(
        &self,
        record: &Arc<LocalExtension>,
        namespace: &Namespace,
    ) -> Result<(), UninstallError> {
        let report = {
            let _operation = self.operations.lock();

            let current = self.index.lookup(record.id());
            if !current.is_some_and(|current| Arc::ptr_eq(&current, record)) {
                debug!(extension = %record.id(), "ignoring uninstall of a stale record");
                return Ok(());
            }

            let affected = if namespace.is_root() {
                record.installed_namespaces()
            } else if record.claims(namespace) {
                vec![namespace.clone()]
            } else {
                Vec::new()
            };
            if affected.is_empty() {
                debug!(
                    extension = %record.id(),
                    namespace = %namespace,
                    "extension not installed in namespace, nothing to uninstall"
                );
                return Ok(());
            }

            record.set_installed(false, namespace);
            for ns in &affected {
                self.backward.unregister(record, ns);
            }

            let mut validator = Validator::new(&self.index, &self.backward, self.core.as_ref());
            for ns in &affected {
                validator.cascade(record.id().id(), ns);
            }
            validator.into_report()
        };

        self.persist(record).map_err(|source| UninstallError::Storage {
            extension: record.id().clone(),
            source,
        })?;

        info!(
            extension = %record.id(),
            namespace = %namespace,
            demoted = report.demoted.len(),
            "uninstalled extension"
        );
        Ok(())
    }

    /// Re-run the full validation pass and rebuild the backward index.
    pub fn revalidate(&self) -> ValidationReport {
        let _operation = self.operations.lock();
        self.backward.clear();
        let report = Validator::new(&self.index, &self.backward, self.core.as_ref()).sweep();
        info!(
            validated = report.validated,
            demoted = report.demoted.len(),
            cycles = report.cycles.len(),
            "revalidated local extension repository"
        );
        report
    }

    /// Another version of `id` installed where `namespace` would see it.
    fn conflicting_install(&self, id: &ExtensionId, namespace: &Namespace) -> Option<Arc<LocalExtension>> {
        self.index
            .versions_of(id.id())
            .iter()
            .rev()
            .find(|other| {
                other.id() != id
                    && if namespace.is_root() {
                        other.is_installed_anywhere()
                    } else {
                        other.is_installed(namespace)
                    }
            })
            .cloned()
    }

    fn check_constraints(&self, record: &LocalExtension, namespace: &Namespace) {
        for dep in record.dependencies() {
            if dep.version_constraint().is_any() || self.core.exists(dep.id()) {
                continue;
            }
            let Some(provider) = self.installed_extension(dep.id(), namespace) else {
                continue;
            };
            if !dep.version_constraint().satisfies(provider.id().version()) {
                warn!(
                    extension = %record.id(),
                    dependency = %dep,
                    installed = %provider.id(),
                    namespace = %namespace,
                    "installed dependency version is outside the declared constraint"
                );
            }
        }
    }

    /// Save the current state of `record`.
    ///
    /// The snapshot is taken under the record's own lock, so the last save
    /// to finish always carries the latest state.
    fn persist(&self, record: &LocalExtension) -> Result<(), StorageError> {
        let _guard = record.persist_guard();
        self.storage.save(&record.to_descriptor())
    }
}
