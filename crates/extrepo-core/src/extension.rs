//! Extension identifiers, metadata and local extension records.

use std::collections::BTreeSet;
use std::fmt;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::error::DescriptorError;
use crate::namespace::Namespace;
use crate::storage::{DependencyDescriptor, ExtensionDescriptor};
use crate::version::{Version, VersionConstraint};

/// Default type tag for extensions that do not declare one.
pub const DEFAULT_EXTENSION_TYPE: &str = "jar";

/// Identifies one version of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionId {
    id: String,
    version: Version,
}

impl ExtensionId {
    pub fn new(id: impl Into<String>, version: impl Into<Version>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.version)
    }
}

/// A declared dependency on another extension id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReference {
    id: String,
    constraint: VersionConstraint,
}

impl DependencyReference {
    /// A dependency accepting any version of `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            constraint: VersionConstraint::any(),
        }
    }

    pub fn with_constraint(id: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            id: id.into(),
            constraint,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version_constraint(&self) -> &VersionConstraint {
        &self.constraint
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_any() {
            f.write_str(&self.id)
        } else {
            write!(f, "{} ({})", self.id, self.constraint)
        }
    }
}

/// Already-resolved extension metadata handed to `install_extension`.
///
/// Fetching the extension content is the caller's business; the repository
/// only records what it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub id: ExtensionId,
    pub kind: String,
    pub dependencies: Vec<DependencyReference>,
}

impl Extension {
    pub fn new(id: impl Into<String>, version: impl Into<Version>) -> Self {
        Self {
            id: ExtensionId::new(id, version),
            kind: DEFAULT_EXTENSION_TYPE.to_string(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_dependency(mut self, dependency: DependencyReference) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Where a record is installed.
///
/// `namespaces == None` with `installed` set means installed at root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct InstallState {
    installed: bool,
    namespaces: Option<BTreeSet<String>>,
}

impl InstallState {
    fn claims(&self, namespace: &Namespace) -> bool {
        if !self.installed {
            return false;
        }
        match (namespace, &self.namespaces) {
            (Namespace::Root, None) => true,
            (Namespace::Root, Some(_)) => false,
            (Namespace::Named(_), None) => false,
            (Namespace::Named(name), Some(names)) => names.contains(name),
        }
    }

    fn set_installed(&mut self, installed: bool, namespace: &Namespace) {
        match (installed, namespace) {
            (true, Namespace::Root) => {
                self.installed = true;
                self.namespaces = None;
            }
            (true, Namespace::Named(name)) => {
                if !self.installed {
                    self.installed = true;
                    self.namespaces = Some(BTreeSet::from([name.clone()]));
                } else if let Some(names) = &mut self.namespaces {
                    names.insert(name.clone());
                }
                // Already installed at root: covers `name` already.
            }
            (false, Namespace::Root) => {
                self.installed = false;
                self.namespaces = None;
            }
            (false, Namespace::Named(name)) => {
                if let Some(names) = &mut self.namespaces {
                    names.remove(name);
                    if names.is_empty() {
                        self.installed = false;
                        self.namespaces = None;
                    }
                }
            }
        }
    }
}

/// An extension record known to the local repository.
///
/// Records are shared as `Arc<LocalExtension>`. Outside this crate they are
/// read-only; their install state only changes through the repository.
#[derive(Debug)]
pub struct LocalExtension {
    id: ExtensionId,
    kind: String,
    dependencies: Vec<DependencyReference>,
    dependency: bool,
    state: RwLock<InstallState>,
    /// Serializes snapshot+write of this record's descriptor.
    persist: Mutex<()>,
}

impl LocalExtension {
    /// Create a record from resolved metadata. The record starts uninstalled.
    pub(crate) fn create(extension: &Extension, dependency: bool) -> Result<Self, DescriptorError> {
        validate_metadata(&extension.id, &extension.dependencies)?;
        Ok(Self {
            id: extension.id.clone(),
            kind: extension.kind.clone(),
            dependencies: extension.dependencies.clone(),
            dependency,
            state: RwLock::new(InstallState::default()),
            persist: Mutex::new(()),
        })
    }

    /// Rebuild a record from its persisted descriptor.
    pub(crate) fn from_descriptor(descriptor: &ExtensionDescriptor) -> Result<Self, DescriptorError> {
        let id = ExtensionId::new(descriptor.id.trim(), descriptor.version.trim());

        let mut dependencies = Vec::with_capacity(descriptor.dependencies.len());
        for dep in &descriptor.dependencies {
            let constraint = match dep.version.as_deref() {
                Some(raw) => VersionConstraint::parse(raw).map_err(|source| {
                    DescriptorError::Constraint {
                        id: id.id().to_string(),
                        source,
                    }
                })?,
                None => VersionConstraint::any(),
            };
            dependencies.push(DependencyReference::with_constraint(dep.id.trim(), constraint));
        }
        validate_metadata(&id, &dependencies)?;

        let namespaces = descriptor
            .namespaces
            .as_ref()
            .map(|names| names.iter().map(|n| n.trim().to_string()).collect::<BTreeSet<_>>());
        // An explicit empty namespace list installs nowhere.
        let installed = descriptor.installed && !namespaces.as_ref().is_some_and(BTreeSet::is_empty);

        let kind = if descriptor.kind.trim().is_empty() {
            DEFAULT_EXTENSION_TYPE.to_string()
        } else {
            descriptor.kind.trim().to_string()
        };

        Ok(Self {
            id,
            kind,
            dependencies,
            dependency: descriptor.dependency,
            state: RwLock::new(InstallState {
                installed,
                namespaces: if installed { namespaces } else { None },
            }),
            persist: Mutex::new(()),
        })
    }

    /// Snapshot this record as a descriptor.
    pub fn to_descriptor(&self) -> ExtensionDescriptor {
        let state = self.state.read().clone();
        ExtensionDescriptor {
            id: self.id.id().to_string(),
            version: self.id.version().to_string(),
            kind: self.kind.clone(),
            installed: state.installed,
            dependency: self.dependency,
            namespaces: state.namespaces.map(|names| names.into_iter().collect()),
            dependencies: self
                .dependencies
                .iter()
                .map(|dep| DependencyDescriptor {
                    id: dep.id().to_string(),
                    version: (!dep.version_constraint().is_any())
                        .then(|| dep.version_constraint().as_str().to_string()),
                })
                .collect(),
        }
    }

    pub fn id(&self) -> &ExtensionId {
        &self.id
    }

    /// The extension type tag (e.g. `jar`, `xar`).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn dependencies(&self) -> &[DependencyReference] {
        &self.dependencies
    }

    /// Whether the record was pulled in as a dependency rather than
    /// requested explicitly.
    pub fn is_dependency(&self) -> bool {
        self.dependency
    }

    /// Whether the record is installed in `namespace`.
    ///
    /// A record installed at root is installed in every namespace.
    pub fn is_installed(&self, namespace: &Namespace) -> bool {
        let state = self.state.read();
        state.claims(namespace) || (!namespace.is_root() && state.claims(&Namespace::Root))
    }

    /// Whether the record is installed anywhere.
    pub fn is_installed_anywhere(&self) -> bool {
        self.state.read().installed
    }

    /// The namespaces this record is installed in: `[Root]` when installed
    /// at root, empty when not installed.
    pub fn installed_namespaces(&self) -> Vec<Namespace> {
        let state = self.state.read();
        if !state.installed {
            return Vec::new();
        }
        match &state.namespaces {
            None => vec![Namespace::Root],
            Some(names) => names.iter().cloned().map(Namespace::Named).collect(),
        }
    }

    /// Whether the record is installed in exactly `namespace`, not merely
    /// covered by a root installation.
    pub(crate) fn claims(&self, namespace: &Namespace) -> bool {
        self.state.read().claims(namespace)
    }

    pub(crate) fn set_installed(&self, installed: bool, namespace: &Namespace) {
        self.state.write().set_installed(installed, namespace);
    }

    pub(crate) fn persist_guard(&self) -> MutexGuard<'_, ()> {
        self.persist.lock()
    }
}

fn validate_metadata(
    id: &ExtensionId,
    dependencies: &[DependencyReference],
) -> Result<(), DescriptorError> {
    if id.id().trim().is_empty() {
        return Err(DescriptorError::EmptyId);
    }
    if id.version().as_str().trim().is_empty() {
        return Err(DescriptorError::EmptyVersion {
            id: id.id().to_string(),
        });
    }
    for dep in dependencies {
        if dep.id().trim().is_empty() {
            return Err(DescriptorError::EmptyDependencyId {
                id: id.id().to_string(),
            });
        }
        if dep.id() == id.id() {
            return Err(DescriptorError::SelfDependency {
                id: id.id().to_string(),
            });
        }
    }
    Ok(())
}
