//! Concurrent install/uninstall against one repository

use std::sync::{Arc, Barrier};
use std::thread;

use extrepo_core::{
    CoreExtensionRegistry, DependencyReference, Extension, InstallError, LocalExtensionRepository,
    MemoryStorage, Namespace, RepositoryConfig,
};
use tempfile::tempdir;

fn memory_repository() -> Arc<LocalExtensionRepository> {
    Arc::new(
        LocalExtensionRepository::with_parts(
            "local",
            Arc::new(MemoryStorage::new()),
            Arc::new(CoreExtensionRegistry::new()),
        )
        .unwrap(),
    )
}

#[test]
fn competing_versions_install_exactly_one() {
    let repo = memory_repository();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                repo.install_extension(
                    &Extension::new("e", format!("1.{t}")),
                    false,
                    &Namespace::named("wiki1"),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let installed = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(InstallError::VersionConflict { .. })))
        .count();

    assert_eq!(installed, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(repo.installed_extensions(None).len(), 1);
}

#[test]
fn same_extension_installed_concurrently_is_idempotent() {
    let repo = memory_repository();
    repo.install_extension(&Extension::new("b", "1"), true, &Namespace::Root)
        .unwrap();
    let barrier = Arc::new(Barrier::new(8));
    let ext = Extension::new("a", "1").with_dependency(DependencyReference::new("b"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            let ext = ext.clone();
            thread::spawn(move || {
                barrier.wait();
                repo.install_extension(&ext, false, &Namespace::named("wiki1"))
                    .unwrap()
            })
        })
        .collect();

    let records: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(records.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(
        repo.get_backward_dependencies("b", &Namespace::named("wiki1"))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn readers_run_alongside_writers() {
    let dir = tempdir().unwrap();
    let config = RepositoryConfig::default().with_root(dir.path());
    let repo = Arc::new(LocalExtensionRepository::open(&config).unwrap());
    let barrier = Arc::new(Barrier::new(5));

    let writers: Vec<_> = (0..4)
        .map(|t| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let namespace = Namespace::named(format!("wiki{t}"));
                for i in 0..10 {
                    let ext = Extension::new(format!("ext-{t}-{i}"), "1.0");
                    let record = repo.install_extension(&ext, false, &namespace).unwrap();
                    if i % 2 == 0 {
                        repo.uninstall_extension(&record, &namespace).unwrap();
                    }
                }
            })
        })
        .collect();

    let reader = {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..50 {
                let all = repo.local_extensions();
                assert!(all.windows(2).all(|w| w[0].id() < w[1].id()));
                assert!(repo.count_extensions() <= 40);
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(repo.count_extensions(), 40);
    assert_eq!(repo.installed_extensions(None).len(), 20);

    let reopened = LocalExtensionRepository::open(&config).unwrap();
    assert_eq!(reopened.count_extensions(), 40);
    assert_eq!(reopened.installed_extensions(None).len(), 20);
}
