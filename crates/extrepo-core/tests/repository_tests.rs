//! Loading, validation and install/uninstall against real descriptor folders

use std::path::Path;
use std::sync::Arc;

use extrepo_core::{
    CoreExtensionRegistry, DependencyDescriptor, DependencyReference, Extension,
    ExtensionDescriptor, ExtensionId, ExtensionStorage, FileStorage, InstallError, LocalExtension,
    LocalExtensionRepository, Namespace, RepositoryConfig, StorageError, UninstallError,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn descriptor(
    id: &str,
    version: &str,
    deps: &[&str],
    namespaces: Option<&[&str]>,
    installed: bool,
) -> ExtensionDescriptor {
    ExtensionDescriptor {
        id: id.to_string(),
        version: version.to_string(),
        kind: "jar".to_string(),
        installed,
        dependency: false,
        namespaces: namespaces.map(|names| names.iter().map(|n| n.to_string()).collect()),
        dependencies: deps
            .iter()
            .map(|dep| DependencyDescriptor {
                id: dep.to_string(),
                version: None,
            })
            .collect(),
    }
}

fn seed(root: &Path, descriptors: &[ExtensionDescriptor]) {
    let storage = FileStorage::new(root, "toml");
    for d in descriptors {
        storage.save(d).unwrap();
    }
}

fn open(root: &Path, core: &[&str]) -> LocalExtensionRepository {
    let config = RepositoryConfig {
        core_extensions: core.iter().map(|id| id.to_string()).collect(),
        ..RepositoryConfig::default()
    }
    .with_root(root);
    LocalExtensionRepository::open(&config).unwrap()
}

fn ids(records: &[Arc<LocalExtension>]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn satisfied_dependencies_stay_installed() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("A", "1", &["B"], Some(&["wiki1"]), true),
            descriptor("B", "1", &[], Some(&["wiki1"]), true),
        ],
    );

    let repo = open(dir.path(), &[]);
    let wiki1 = Namespace::named("wiki1");

    assert!(repo.installed_extension("A", &wiki1).is_some());
    assert!(repo.installed_extension("B", &wiki1).is_some());
    assert_eq!(ids(&repo.get_backward_dependencies("B", &wiki1).unwrap()), vec!["A/1"]);
}

#[test]
fn missing_dependency_demotes_on_load() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[descriptor("C", "1", &["D"], None, true)]);

    let repo = open(dir.path(), &[]);
    let c = repo.resolve(&ExtensionId::new("C", "1")).unwrap();

    assert!(!c.is_installed_anywhere());
    assert_eq!(repo.count_extensions(), 1);
    assert_eq!(repo.load_report().demoted.len(), 1);
    assert!(repo.installed_extensions(None).is_empty());
}

#[test]
fn older_installed_version_is_not_upgraded() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("E", "1", &[], None, true),
            descriptor("E", "2", &[], None, false),
        ],
    );

    let repo = open(dir.path(), &[]);

    assert_eq!(ids(&repo.installed_extensions(None)), vec!["E/1"]);
    assert_eq!(
        repo.installed_extension("E", &Namespace::named("wiki1")).unwrap().id(),
        &ExtensionId::new("E", "1")
    );
    let versions: Vec<String> = repo
        .versions_of("E")
        .iter()
        .map(|r| r.id().version().to_string())
        .collect();
    assert_eq!(versions, vec!["1", "2"]);
}

#[test]
fn core_extension_shadows_local_record() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("platform", "1", &[], None, true),
            descriptor("app", "1", &["platform"], None, true),
        ],
    );

    let repo = open(dir.path(), &["platform"]);

    assert!(repo.installed_extension("platform", &Namespace::Root).is_none());
    assert!(repo.installed_extension("app", &Namespace::Root).is_some());
}

#[test]
fn two_installed_versions_keep_only_the_newest() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("E", "1.0", &[], Some(&["wiki1"]), true),
            descriptor("E", "1.10", &[], Some(&["wiki1"]), true),
            descriptor("E", "1.9", &[], Some(&["wiki1"]), true),
        ],
    );

    let repo = open(dir.path(), &[]);

    assert_eq!(ids(&repo.installed_extensions(None)), vec!["E/1.10"]);
}

#[test]
fn unreadable_descriptors_are_skipped() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("good", "1", &[], None, true),
            descriptor("selfish", "1", &["selfish"], None, true),
        ],
    );
    std::fs::write(dir.path().join("broken.toml"), "installed = maybe").unwrap();

    let repo = open(dir.path(), &[]);

    assert_eq!(ids(&repo.local_extensions()), vec!["good/1"]);
    assert_eq!(repo.repository_id(), "local");
}

#[test]
fn state_survives_reopen() {
    let dir = tempdir().unwrap();
    let wiki1 = Namespace::named("wiki1");
    {
        let repo = open(dir.path(), &[]);
        repo.install_extension(&Extension::new("org.example:b", "1.0"), true, &Namespace::Root)
            .unwrap();
        repo.install_extension(
            &Extension::new("org.example:a", "2.0-rc1")
                .with_kind("xar")
                .with_dependency(DependencyReference::new("org.example:b")),
            false,
            &wiki1,
        )
        .unwrap();
    }

    let repo = open(dir.path(), &[]);
    let a = repo.installed_extension("org.example:a", &wiki1).unwrap();

    assert_eq!(a.kind(), "xar");
    assert!(!a.is_dependency());
    assert!(repo.installed_extension("org.example:a", &Namespace::Root).is_none());
    assert_eq!(
        ids(&repo.get_backward_dependencies("org.example:b", &wiki1).unwrap()),
        vec!["org.example:a/2.0-rc1"]
    );
    let by_namespace = repo
        .get_backward_dependencies_of(&ExtensionId::new("org.example:b", "1.0"))
        .unwrap();
    assert_eq!(by_namespace.keys().cloned().collect::<Vec<_>>(), vec![wiki1]);
}

#[test]
fn uninstall_round_trip_is_persisted() {
    let dir = tempdir().unwrap();
    let wiki1 = Namespace::named("wiki1");
    {
        let repo = open(dir.path(), &[]);
        let a = repo
            .install_extension(&Extension::new("a", "1"), false, &wiki1)
            .unwrap();
        repo.uninstall_extension(&a, &wiki1).unwrap();
        assert!(repo.installed_extension("a", &wiki1).is_none());
    }

    let repo = open(dir.path(), &[]);
    assert!(repo.exists(&ExtensionId::new("a", "1")));
    assert!(repo.installed_extension("a", &wiki1).is_none());
}

#[test]
fn demotion_is_not_written_back() {
    let dir = tempdir().unwrap();
    seed(dir.path(), &[descriptor("C", "1", &["D"], None, true)]);

    {
        let repo = open(dir.path(), &[]);
        assert!(repo.installed_extension("C", &Namespace::Root).is_none());
        // D arriving later does not resurrect C in this session.
        repo.install_extension(&Extension::new("D", "1"), true, &Namespace::Root)
            .unwrap();
        assert!(repo.revalidate().demoted.is_empty());
        assert!(repo.installed_extension("C", &Namespace::Root).is_none());
    }

    let on_disk = FileStorage::new(dir.path(), "toml")
        .load_all()
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .find(|d| d.id == "C")
        .unwrap();
    assert!(on_disk.installed);

    let repo = open(dir.path(), &[]);
    assert!(repo.installed_extension("C", &Namespace::Root).is_some());
}

#[test]
fn revalidate_reports_cycles_and_rebuilds_edges() {
    let dir = tempdir().unwrap();
    seed(
        dir.path(),
        &[
            descriptor("a", "1", &["b"], None, true),
            descriptor("b", "1", &["a"], None, true),
        ],
    );

    let repo = open(dir.path(), &[]);
    let report = repo.revalidate();

    assert!(report.demoted.is_empty());
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.validated, 2);
    assert_eq!(ids(&repo.get_backward_dependencies("a", &Namespace::Root).unwrap()), vec!["b/1"]);
    assert_eq!(ids(&repo.get_backward_dependencies("b", &Namespace::Root).unwrap()), vec!["a/1"]);
}

/// Saves always fail.
struct FailingStorage;

impl ExtensionStorage for FailingStorage {
    fn load_all(&self) -> Result<Vec<Result<ExtensionDescriptor, StorageError>>, StorageError> {
        Ok(Vec::new())
    }

    fn save(&self, _descriptor: &ExtensionDescriptor) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk full".to_string()))
    }
}

#[test]
fn storage_failure_is_reported_without_rollback() {
    let repo = LocalExtensionRepository::with_parts(
        "local",
        Arc::new(FailingStorage),
        Arc::new(CoreExtensionRegistry::new()),
    )
    .unwrap();

    let err = repo
        .install_extension(&Extension::new("a", "1"), false, &Namespace::Root)
        .unwrap_err();
    assert!(matches!(
        err,
        InstallError::Storage {
            source: StorageError::Unavailable(_),
            ..
        }
    ));
    let a = repo.installed_extension("a", &Namespace::Root).unwrap();

    let err = repo.uninstall_extension(&a, &Namespace::Root).unwrap_err();
    assert!(matches!(err, UninstallError::Storage { .. }));
    assert!(repo.installed_extension("a", &Namespace::Root).is_none());
}

#[test]
fn unreadable_store_fails_to_open() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("file");
    std::fs::write(&root, "not a folder").unwrap();

    let config = RepositoryConfig::default().with_root(&root);
    assert!(matches!(
        LocalExtensionRepository::open(&config),
        Err(StorageError::Fs(_))
    ));
}
