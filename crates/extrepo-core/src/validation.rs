//! Installed-state validation.
//!
//! A validation pass decides, for every `(id, namespace)` node, which record
//! (if any) is validly installed there and registers the winners in the
//! backward dependency index. Everything else that claims the node is
//! demoted. A record stays installed only if:
//!
//! - no core extension exists for its id,
//! - no newer version of the same id already won the node, and no version
//!   of it is installed at root when the node is a named namespace,
//! - every dependency is provided by a core extension or by a record
//!   installed in the same namespace or at root.
//!
//! The walk is a depth-first search driven by an explicit stack. A node is
//! marked in-progress before its prerequisites are pushed, so a dependency
//! cycle reaches an in-progress node instead of recursing forever. Such a
//! dependency counts as satisfied by assumption; once every node is done the
//! assumptions are re-checked and broken ones are demoted with their
//! dependents. When a node's winner falls that way, the newest claimant it
//! shadowed that is still valid takes the node over.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backward::BackwardDependencies;
use crate::core_extension::CoreExtensionRepository;
use crate::extension::{DependencyReference, ExtensionId, LocalExtension};
use crate::index::ExtensionIndex;
use crate::namespace::Namespace;

/// Why a record lost its installed flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemotionReason {
    /// A core extension owns the id.
    CoreExtension,
    /// Another version of the same id is the installed one.
    Shadowed { by: ExtensionId },
    /// A dependency is neither installed nor a core extension.
    UnsatisfiedDependency { dependency: String },
}

/// One record demoted in one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demotion {
    pub extension: ExtensionId,
    pub namespace: Namespace,
    pub reason: DemotionReason,
}

/// A dependency edge found to close a cycle during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle {
    pub dependent: ExtensionId,
    pub dependency: String,
    pub namespace: Namespace,
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of `(id, namespace)` nodes processed.
    pub validated: usize,
    pub demoted: Vec<Demotion>,
    pub cycles: Vec<DependencyCycle>,
}

/// The record of `id` installed in `namespace`, counting root installs.
pub(crate) fn installed_record(
    index: &ExtensionIndex,
    id: &str,
    namespace: &Namespace,
) -> Option<Arc<LocalExtension>> {
    index
        .versions_of(id)
        .iter()
        .rev()
        .find(|record| record.is_installed(namespace))
        .cloned()
}

/// The first dependency of `record` that nothing provides in `namespace`.
pub(crate) fn unsatisfied_dependency<'r>(
    index: &ExtensionIndex,
    core: &dyn CoreExtensionRepository,
    record: &'r LocalExtension,
    namespace: &Namespace,
) -> Option<&'r DependencyReference> {
    record.dependencies().iter().find(|dep| {
        !core.exists(dep.id()) && installed_record(index, dep.id(), namespace).is_none()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

type Node = (String, Namespace);

struct Frame {
    node: Node,
    expanded: bool,
}

/// A dependency counted as satisfied while its node was still in progress.
struct AssumedEdge {
    dependent: Arc<LocalExtension>,
    dependency: String,
    namespace: Namespace,
}

enum DependencyState {
    Satisfied(Arc<LocalExtension>),
    Assumed,
    Missing,
}

/// One validation pass over the shared index.
pub(crate) struct Validator<'a> {
    index: &'a ExtensionIndex,
    backward: &'a BackwardDependencies,
    core: &'a dyn CoreExtensionRepository,
    marks: HashMap<Node, Mark>,
    assumed: Vec<AssumedEdge>,
    /// Claimants demoted as shadowed, per node, newest first.
    shadowed: HashMap<Node, Vec<Arc<LocalExtension>>>,
    report: ValidationReport,
}

impl<'a> Validator<'a> {
    pub(crate) fn new(
        index: &'a ExtensionIndex,
        backward: &'a BackwardDependencies,
        core: &'a dyn CoreExtensionRepository,
    ) -> Self {
        Self {
            index,
            backward,
            core,
            marks: HashMap::new(),
            assumed: Vec::new(),
            shadowed: HashMap::new(),
            report: ValidationReport::default(),
        }
    }

    /// Validate every node some record claims, newest versions first.
    ///
    /// The backward dependency index is expected to be empty.
    pub(crate) fn sweep(mut self) -> ValidationReport {
        for id in self.index.ids() {
            let versions = self.index.versions_of(&id);
            for record in versions.iter().rev() {
                for namespace in record.installed_namespaces() {
                    self.validate(&id, &namespace);
                }
            }
        }
        self.settle();
        self.report
    }

    pub(crate) fn into_report(self) -> ValidationReport {
        self.report
    }

    /// Validate the `(id, namespace)` node and everything it depends on.
    pub(crate) fn validate(&mut self, id: &str, namespace: &Namespace) {
        let start: Node = (id.to_string(), namespace.clone());
        if self.marks.contains_key(&start) {
            return;
        }

        let mut stack = vec![Frame {
            node: start,
            expanded: false,
        }];

        while let Some(top) = stack.len().checked_sub(1) {
            if stack[top].expanded {
                let Some(frame) = stack.pop() else { break };
                self.finalize(&frame.node);
                self.marks.insert(frame.node, Mark::Done);
                continue;
            }

            // The same node may have been pushed by two parents.
            if self.marks.contains_key(&stack[top].node) {
                stack.pop();
                continue;
            }

            stack[top].expanded = true;
            let node = stack[top].node.clone();
            self.marks.insert(node.clone(), Mark::InProgress);

            let prerequisites = self.prerequisites(&node);
            for prerequisite in prerequisites.into_iter().rev() {
                if !self.marks.contains_key(&prerequisite) {
                    stack.push(Frame {
                        node: prerequisite,
                        expanded: false,
                    });
                }
            }
        }
    }

    /// Nodes that must be decided before `node` can be.
    fn prerequisites(&self, node: &Node) -> Vec<Node> {
        let (id, namespace) = node;
        let mut prerequisites = Vec::new();

        if !namespace.is_root() {
            prerequisites.push((id.clone(), Namespace::Root));
        }
        if self.core.exists(id) {
            return prerequisites;
        }

        for record in self.index.versions_of(id).iter().rev() {
            if !record.claims(namespace) {
                continue;
            }
            for dep in record.dependencies() {
                if self.core.exists(dep.id()) {
                    continue;
                }
                if !namespace.is_root() {
                    prerequisites.push((dep.id().to_string(), Namespace::Root));
                }
                prerequisites.push((dep.id().to_string(), namespace.clone()));
            }
        }
        prerequisites
    }

    /// Pick the installed record of `node`, demoting every other claimant.
    fn finalize(&mut self, node: &Node) {
        let (id, namespace) = node;
        let versions = self.index.versions_of(id);
        let is_core = self.core.exists(id);

        let root_winner = if namespace.is_root() {
            None
        } else {
            versions
                .iter()
                .rev()
                .find(|record| record.claims(&Namespace::Root))
                .cloned()
        };
        let mut winner: Option<Arc<LocalExtension>> = None;

        for record in versions.iter().rev() {
            if !record.claims(namespace) {
                continue;
            }

            let reason = if is_core {
                Some(DemotionReason::CoreExtension)
            } else if let Some(other) = winner.as_ref().or(root_winner.as_ref()) {
                Some(DemotionReason::Shadowed {
                    by: other.id().clone(),
                })
            } else {
                self.check_dependencies(record, namespace)
            };

            match reason {
                Some(reason) => {
                    if let DemotionReason::Shadowed { .. } = reason {
                        self.shadowed
                            .entry(node.clone())
                            .or_default()
                            .push(Arc::clone(record));
                    }
                    self.demote(record, namespace, reason);
                }
                None => {
                    self.backward.register(record, namespace);
                    winner = Some(Arc::clone(record));
                }
            }
        }

        debug!(
            extension = %id,
            namespace = %namespace,
            installed = ?winner.as_ref().map(|record| record.id().version().to_string()),
            "validated extension"
        );
        self.report.validated += 1;
    }

    fn check_dependencies(
        &mut self,
        record: &Arc<LocalExtension>,
        namespace: &Namespace,
    ) -> Option<DemotionReason> {
        for dep in record.dependencies() {
            if self.core.exists(dep.id()) {
                continue;
            }
            match self.dependency_state(dep.id(), namespace) {
                DependencyState::Satisfied(provider) => {
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
                DependencyState::Assumed => {
                    debug!(
                        extension = %record.id(),
                        dependency = %dep.id(),
                        namespace = %namespace,
                        "dependency cycle, assuming satisfied"
                    );
                    self.report.cycles.push(DependencyCycle {
                        dependent: record.id().clone(),
                        dependency: dep.id().to_string(),
                        namespace: namespace.clone(),
                    });
                    self.assumed.push(AssumedEdge {
                        dependent: Arc::clone(record),
                        dependency: dep.id().to_string(),
                        namespace: namespace.clone(),
                    });
                }
                DependencyState::Missing => {
                    return Some(DemotionReason::UnsatisfiedDependency {
                        dependency: dep.id().to_string(),
                    });
                }
            }
        }
        None
    }

    /// Look at the root node of `id` and, for a named namespace, its own
    /// node. In-progress nodes are not trusted: their flags are undecided.
    fn dependency_state(&self, id: &str, namespace: &Namespace) -> DependencyState {
        let mut nodes = vec![Namespace::Root];
        if !namespace.is_root() {
            nodes.push(namespace.clone());
        }

        let mut pending = false;
        for ns in nodes {
            let node = (id.to_string(), ns);
            if self.marks.get(&node) == Some(&Mark::InProgress) {
                pending = true;
                continue;
            }
            let provider = self
                .index
                .versions_of(id)
                .iter()
                .rev()
                .find(|record| record.claims(&node.1))
                .cloned();
            if let Some(provider) = provider {
                return DependencyState::Satisfied(provider);
            }
        }

        if pending {
            DependencyState::Assumed
        } else {
            DependencyState::Missing
        }
    }

    /// Re-check every dependency that was assumed satisfied.
    fn settle(&mut self) {
        for edge in std::mem::take(&mut self.assumed) {
            if !edge.dependent.claims(&edge.namespace) {
                continue;
            }
            if let DependencyState::Missing = self.dependency_state(&edge.dependency, &edge.namespace)
            {
                self.withdraw(
                    &edge.dependent,
                    &edge.namespace,
                    DemotionReason::UnsatisfiedDependency {
                        dependency: edge.dependency.clone(),
                    },
                );
                self.cascade(edge.dependent.id().id(), &edge.namespace);
            }
        }
    }

    /// Demote installed dependents of `id` that lost their provider in
    /// `namespace`, transitively. For root, dependents in every namespace
    /// are checked.
    pub(crate) fn cascade(&mut self, id: &str, namespace: &Namespace) {
        let mut queue = VecDeque::from([(id.to_string(), namespace.clone())]);

        while let Some((id, namespace)) = queue.pop_front() {
            let dependents: Vec<(Namespace, Arc<LocalExtension>)> = if namespace.is_root() {
                self.backward
                    .query_all(&id)
                    .into_iter()
                    .flat_map(|(ns, records)| records.into_iter().map(move |r| (ns.clone(), r)))
                    .collect()
            } else {
                self.backward
                    .query(&id, &namespace)
                    .into_iter()
                    .map(|r| (namespace.clone(), r))
                    .collect()
            };

            for (ns, dependent) in dependents {
                if !dependent.claims(&ns) {
                    continue;
                }
                if self.core.exists(&id) || installed_record(self.index, &id, &ns).is_some() {
                    continue;
                }
                self.withdraw(
                    &dependent,
                    &ns,
                    DemotionReason::UnsatisfiedDependency {
                        dependency: id.clone(),
                    },
                );
                queue.push_back((dependent.id().id().to_string(), ns));
            }
        }
    }

    /// Demote a node's winner and hand the node to the newest shadowed
    /// claimant that is still valid.
    fn withdraw(&mut self, record: &Arc<LocalExtension>, namespace: &Namespace, reason: DemotionReason) {
        self.demote(record, namespace, reason);
        self.reelect(record.id().id(), namespace);
    }

    fn reelect(&mut self, id: &str, namespace: &Namespace) {
        if installed_record(self.index, id, namespace).is_some() {
            return;
        }

        let node: Node = (id.to_string(), namespace.clone());
        let mut candidates = self.shadowed.remove(&node).unwrap_or_default().into_iter();
        let mut winner = None;
        for candidate in candidates.by_ref() {
            let missing = unsatisfied_dependency(self.index, self.core, &candidate, namespace)
                .map(|dep| dep.id().to_string());
            match missing {
                None => {
                    winner = Some(candidate);
                    break;
                }
                Some(dependency) => {
                    let reason = DemotionReason::UnsatisfiedDependency { dependency };
                    self.restate(&candidate, namespace, reason);
                }
            }
        }

        let Some(winner) = winner else {
            if namespace.is_root() {
                // Named installs of `id` were shadowed by the root winner.
                for ns in self.shadowed_namespaces(id) {
                    self.reelect(id, &ns);
                }
            }
            return;
        };

        winner.set_installed(true, namespace);
        self.backward.register(&winner, namespace);
        self.report.demoted.retain(|demotion| {
            demotion.extension != *winner.id() || demotion.namespace != *namespace
        });
        debug!(
            extension = %winner.id(),
            namespace = %namespace,
            "shadowed extension reinstated"
        );

        let by = winner.id().clone();
        let losers: Vec<Arc<LocalExtension>> = candidates.collect();
        for loser in &losers {
            self.restate(loser, namespace, DemotionReason::Shadowed { by: by.clone() });
        }
        if !losers.is_empty() {
            self.shadowed.insert(node, losers);
        }
        if namespace.is_root() {
            for ns in self.shadowed_namespaces(id) {
                let named = self.shadowed.get(&(id.to_string(), ns.clone())).cloned();
                for loser in named.unwrap_or_default() {
                    self.restate(&loser, &ns, DemotionReason::Shadowed { by: by.clone() });
                }
            }
        }
    }

    fn shadowed_namespaces(&self, id: &str) -> Vec<Namespace> {
        self.shadowed
            .keys()
            .filter(|(other, ns)| other == id && !ns.is_root())
            .map(|(_, ns)| ns.clone())
            .collect()
    }

    /// Replace the reported reason of an existing demotion.
    fn restate(&mut self, record: &LocalExtension, namespace: &Namespace, reason: DemotionReason) {
        if let Some(demotion) = self
            .report
            .demoted
            .iter_mut()
            .find(|d| d.extension == *record.id() && d.namespace == *namespace)
        {
            demotion.reason = reason;
        }
    }

    fn demote(&mut self, record: &Arc<LocalExtension>, namespace: &Namespace, reason: DemotionReason) {
        record.set_installed(false, namespace);
        self.backward.unregister(record, namespace);

        warn!(
            extension = %record.id(),
            namespace = %namespace,
            reason = ?reason,
            "extension demoted to not installed"
        );
        self.report.demoted.push(Demotion {
            extension: record.id().clone(),
            namespace: namespace.clone(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_extension::CoreExtensionRegistry;
    use crate::extension::Extension;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct Fixture {
        index: ExtensionIndex,
        backward: BackwardDependencies,
        core: CoreExtensionRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                index: ExtensionIndex::new(),
                backward: BackwardDependencies::new(),
                core: CoreExtensionRegistry::new(),
            }
        }

        fn add(&self, id: &str, version: &str, deps: &[&str], namespaces: &[Namespace]) -> Arc<LocalExtension> {
            let mut ext = Extension::new(id, version);
            for dep in deps {
                ext = ext.with_dependency(DependencyReference::new(*dep));
            }
            let record = Arc::new(LocalExtension::create(&ext, false).unwrap());
            for ns in namespaces {
                record.set_installed(true, ns);
            }
            self.index.upsert(record)
        }

        fn sweep(&self) -> ValidationReport {
            Validator::new(&self.index, &self.backward, &self.core).sweep()
        }

        fn dependents(&self, id: &str, ns: &Namespace) -> Vec<String> {
            self.backward
                .query(id, ns)
                .iter()
                .map(|r| r.id().to_string())
                .collect()
        }
    }

    fn wiki(name: &str) -> Namespace {
        Namespace::named(name)
    }

    #[test]
    fn satisfied_chain_stays_installed() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[wiki("wiki1")]);
        let b = f.add("b", "1", &[], &[wiki("wiki1")]);

        let report = f.sweep();

        assert!(a.is_installed(&wiki("wiki1")));
        assert!(b.is_installed(&wiki("wiki1")));
        assert!(report.demoted.is_empty());
        assert_eq!(f.dependents("b", &wiki("wiki1")), vec!["a/1"]);
    }

    #[test]
    fn missing_dependency_demotes_transitively() {
        let f = Fixture::new();
        let top = f.add("top", "1", &["mid"], &[Namespace::Root]);
        let mid = f.add("mid", "1", &["gone"], &[Namespace::Root]);

        let report = f.sweep();

        assert!(!top.is_installed_anywhere());
        assert!(!mid.is_installed_anywhere());
        assert_eq!(report.demoted.len(), 2);
        assert_eq!(f.backward.edge_count(), 0);
    }

    #[test]
    fn core_dependency_is_satisfied_and_core_id_is_demoted() {
        let mut f = Fixture::new();
        f.core = CoreExtensionRegistry::with_ids(["platform"]);
        let app = f.add("app", "1", &["platform"], &[Namespace::Root]);
        let shadow = f.add("platform", "9", &[], &[Namespace::Root]);

        let report = f.sweep();

        assert!(app.is_installed(&Namespace::Root));
        assert!(!shadow.is_installed_anywhere());
        assert_eq!(
            report.demoted,
            vec![Demotion {
                extension: ExtensionId::new("platform", "9"),
                namespace: Namespace::Root,
                reason: DemotionReason::CoreExtension,
            }]
        );
    }

    #[test]
    fn newest_installed_version_wins() {
        let f = Fixture::new();
        let old = f.add("e", "1", &[], &[Namespace::Root]);
        let new = f.add("e", "2", &[], &[Namespace::Root]);

        let report = f.sweep();

        assert!(new.is_installed(&Namespace::Root));
        assert!(!old.is_installed_anywhere());
        assert_eq!(
            report.demoted[0].reason,
            DemotionReason::Shadowed {
                by: ExtensionId::new("e", "2")
            }
        );
    }

    #[test]
    fn newest_version_with_broken_dependency_falls_back() {
        let f = Fixture::new();
        let old = f.add("e", "1", &[], &[Namespace::Root]);
        let new = f.add("e", "2", &["missing"], &[Namespace::Root]);

        f.sweep();

        assert!(!new.is_installed_anywhere());
        assert!(old.is_installed(&Namespace::Root));
    }

    #[test]
    fn root_install_shadows_named_install_of_other_version() {
        let f = Fixture::new();
        let root = f.add("e", "1", &[], &[Namespace::Root]);
        let named = f.add("e", "2", &[], &[wiki("wiki1")]);

        f.sweep();

        assert!(root.is_installed(&wiki("wiki1")));
        assert!(!named.is_installed_anywhere());
    }

    #[test]
    fn named_dependent_may_use_root_dependency() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[wiki("wiki1")]);
        f.add("b", "1", &[], &[Namespace::Root]);

        f.sweep();

        assert!(a.is_installed(&wiki("wiki1")));
        assert_eq!(f.dependents("b", &wiki("wiki1")), vec!["a/1"]);
    }

    #[test]
    fn root_dependent_cannot_use_named_dependency() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[Namespace::Root]);
        f.add("b", "1", &[], &[wiki("wiki1")]);

        f.sweep();

        assert!(!a.is_installed_anywhere());
    }

    #[test]
    fn namespaces_are_validated_independently() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[wiki("wiki1"), wiki("wiki2")]);
        f.add("b", "1", &[], &[wiki("wiki2")]);

        f.sweep();

        assert!(!a.is_installed(&wiki("wiki1")));
        assert!(a.is_installed(&wiki("wiki2")));
    }

    #[test]
    fn cycle_terminates_and_keeps_both() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[wiki("wiki1")]);
        let b = f.add("b", "1", &["a"], &[wiki("wiki1")]);

        let report = f.sweep();

        assert!(a.is_installed(&wiki("wiki1")));
        assert!(b.is_installed(&wiki("wiki1")));
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(f.dependents("a", &wiki("wiki1")), vec!["b/1"]);
        assert_eq!(f.dependents("b", &wiki("wiki1")), vec!["a/1"]);
    }

    #[test]
    fn broken_cycle_demotes_every_member() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b", "missing"], &[Namespace::Root]);
        let b = f.add("b", "1", &["c"], &[Namespace::Root]);
        let c = f.add("c", "1", &["a"], &[Namespace::Root]);

        f.sweep();

        assert!(!a.is_installed_anywhere());
        assert!(!b.is_installed_anywhere());
        assert!(!c.is_installed_anywhere());
        assert_eq!(f.backward.edge_count(), 0);
    }

    #[test]
    fn not_installed_records_are_left_alone() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["missing"], &[]);

        let report = f.sweep();

        assert!(!a.is_installed_anywhere());
        assert!(report.demoted.is_empty());
        assert_eq!(report.validated, 0);
    }

    #[test]
    fn cascade_follows_backward_edges() {
        let f = Fixture::new();
        let a = f.add("a", "1", &["b"], &[Namespace::Root]);
        let b = f.add("b", "1", &["c"], &[Namespace::Root]);
        let c = f.add("c", "1", &[], &[Namespace::Root]);
        f.sweep();

        c.set_installed(false, &Namespace::Root);
        let mut validator = Validator::new(&f.index, &f.backward, &f.core);
        validator.cascade("c", &Namespace::Root);
        let report = validator.into_report();

        assert!(!b.is_installed_anywhere());
        assert!(!a.is_installed_anywhere());
        assert_eq!(report.demoted.len(), 2);
    }

    #[rstest]
    #[case::dependent_sorted_first("a")]
    #[case::dependent_sorted_last("z")]
    fn older_version_takes_over_when_cycle_winner_falls(#[case] dependent: &str) {
        let f = Fixture::new();
        let top = f.add(dependent, "1", &["e", "missing"], &[Namespace::Root]);
        let old = f.add("e", "1", &[], &[Namespace::Root]);
        let new = f.add("e", "2", &[dependent], &[Namespace::Root]);

        let report = f.sweep();

        assert!(!top.is_installed_anywhere());
        assert!(!new.is_installed_anywhere());
        assert!(old.is_installed(&Namespace::Root));
        assert!(report.demoted.iter().all(|d| d.extension != *old.id()));
        assert_eq!(f.backward.edge_count(), 0);
    }

    #[test]
    fn named_install_takes_over_when_root_winner_falls() {
        let f = Fixture::new();
        f.add("a", "1", &["e", "missing"], &[Namespace::Root]);
        let root = f.add("e", "2", &["a"], &[Namespace::Root]);
        let named = f.add("e", "1", &[], &[wiki("wiki1")]);
        let user = f.add("u", "1", &["e"], &[wiki("wiki1")]);

        let report = f.sweep();

        assert!(!root.is_installed_anywhere());
        assert!(named.is_installed(&wiki("wiki1")));
        assert!(user.is_installed(&wiki("wiki1")));
        assert!(report.demoted.iter().all(|d| d.extension != *named.id()));
    }

    #[test]
    fn remaining_shadowed_claimants_point_at_new_winner() {
        let f = Fixture::new();
        f.add("a", "1", &["e", "missing"], &[Namespace::Root]);
        f.add("e", "3", &["a"], &[Namespace::Root]);
        let middle = f.add("e", "2", &[], &[Namespace::Root]);
        let oldest = f.add("e", "1", &[], &[Namespace::Root]);

        let report = f.sweep();

        assert!(middle.is_installed(&Namespace::Root));
        assert!(!oldest.is_installed_anywhere());
        let oldest_demotion = report
            .demoted
            .iter()
            .find(|d| d.extension == *oldest.id())
            .unwrap();
        assert_eq!(
            oldest_demotion.reason,
            DemotionReason::Shadowed {
                by: ExtensionId::new("e", "2")
            }
        );
    }

    #[test]
    fn skipped_claimant_reports_its_own_missing_dependency() {
        let f = Fixture::new();
        f.add("a", "1", &["e", "missing"], &[Namespace::Root]);
        f.add("e", "3", &["a"], &[Namespace::Root]);
        let broken = f.add("e", "2", &["gone"], &[Namespace::Root]);
        let oldest = f.add("e", "1", &[], &[Namespace::Root]);

        let report = f.sweep();

        assert!(oldest.is_installed(&Namespace::Root));
        assert!(!broken.is_installed_anywhere());
        let broken_demotion = report
            .demoted
            .iter()
            .find(|d| d.extension == *broken.id())
            .unwrap();
        assert_eq!(
            broken_demotion.reason,
            DemotionReason::UnsatisfiedDependency {
                dependency: "gone".to_string()
            }
        );
    }
}
