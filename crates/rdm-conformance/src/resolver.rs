//! Builds the per-run dependency graph.
//!
//! Starting from the selected tests, every test a selected test needs is
//! instantiated as well, either because it provides a required property or
//! because it is listed as a static dependency. Each test is instantiated at
//! most once per run, so diamond-shaped dependencies share one instance.

use crate::error::{ConformanceError, Result};
use crate::registry::TestRegistry;
use crate::test_case::{DeviceTarget, ResponderTest, TestContext, TestDescriptor, TestFuture};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Which registered tests a run asks for. Their dependencies are always
/// pulled in on top.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Named(HashSet<String>),
}

impl Selection {
    #[must_use]
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    fn includes(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// One test bound to the current run.
pub struct TestInstance {
    registration_index: usize,
    descriptor: Arc<TestDescriptor>,
    test: Box<dyn ResponderTest>,
    requires: Vec<String>,
}

impl TestInstance {
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    #[must_use]
    pub fn descriptor(&self) -> &TestDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn registration_index(&self) -> usize {
        self.registration_index
    }

    /// Required property names, as reported when the instance was created.
    #[must_use]
    pub fn requires(&self) -> &[String] {
        &self.requires
    }

    pub fn run<'a>(&'a mut self, ctx: &'a mut TestContext<'_>) -> TestFuture<'a> {
        self.test.run(ctx)
    }
}

impl fmt::Debug for TestInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestInstance")
            .field("name", &self.name())
            .field("registration_index", &self.registration_index)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

/// Instances of one run and the instances each of them depends on.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    instances: Vec<TestInstance>,
    deps: Vec<BTreeSet<InstanceId>>,
}

impl DependencyGraph {
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = InstanceId> {
        (0..self.instances.len()).map(InstanceId)
    }

    #[must_use]
    pub fn instance(&self, id: InstanceId) -> &TestInstance {
        &self.instances[id.0]
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> &mut TestInstance {
        &mut self.instances[id.0]
    }

    #[must_use]
    pub fn dependencies(&self, id: InstanceId) -> &BTreeSet<InstanceId> {
        &self.deps[id.0]
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<InstanceId> {
        self.instances
            .iter()
            .position(|instance| instance.name() == name)
            .map(InstanceId)
    }

    fn push(&mut self, instance: TestInstance, deps: BTreeSet<InstanceId>) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(instance);
        self.deps.push(deps);
        id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done(InstanceId),
}

pub struct DependencyResolver<'a> {
    registry: &'a TestRegistry,
    device: &'a DeviceTarget,
    marks: Vec<Visit>,
    path: Vec<usize>,
    graph: DependencyGraph,
}

impl<'a> DependencyResolver<'a> {
    #[must_use]
    pub fn new(registry: &'a TestRegistry, device: &'a DeviceTarget) -> Self {
        Self {
            registry,
            device,
            marks: vec![Visit::Unvisited; registry.len()],
            path: Vec::new(),
            graph: DependencyGraph::default(),
        }
    }

    pub fn resolve(mut self, selection: &Selection) -> Result<DependencyGraph> {
        if let Selection::Named(names) = selection {
            for name in names {
                if self.registry.index_of(name).is_none() {
                    warn!("Ignoring unknown test {name} in the run selection");
                }
            }
        }

        for (index, descriptor) in self.registry.descriptors().iter().enumerate() {
            if selection.includes(descriptor.name()) {
                self.add_test(index)?;
            }
        }
        Ok(self.graph)
    }

    fn add_test(&mut self, index: usize) -> Result<InstanceId> {
        match self.marks[index] {
            Visit::Done(id) => return Ok(id),
            Visit::InProgress => return Err(self.cycle_error(index)),
            Visit::Unvisited => {}
        }

        self.marks[index] = Visit::InProgress;
        self.path.push(index);

        let descriptor = Arc::clone(&self.registry.descriptors()[index]);
        let test = descriptor.instantiate(self.device);
        let requires = test.requires();

        let mut dep_indices = Vec::with_capacity(requires.len() + descriptor.static_deps().len());
        for property in &requires {
            let producer = self.registry.producer_of(property).ok_or_else(|| {
                ConformanceError::MissingProperty {
                    property: property.clone(),
                    test: descriptor.name().to_string(),
                }
            })?;
            dep_indices.push(producer);
        }
        for dep in descriptor.static_deps() {
            let dep_index =
                self.registry
                    .index_of(dep)
                    .ok_or_else(|| ConformanceError::UnknownDependency {
                        test: descriptor.name().to_string(),
                        dependency: dep.clone(),
                    })?;
            dep_indices.push(dep_index);
        }

        let mut deps = BTreeSet::new();
        for dep_index in dep_indices {
            deps.insert(self.add_test(dep_index)?);
        }

        self.path.pop();
        let instance = TestInstance {
            registration_index: index,
            descriptor,
            test,
            requires,
        };
        let id = self.graph.push(instance, deps);
        self.marks[index] = Visit::Done(id);
        Ok(id)
    }

    fn cycle_error(&self, index: usize) -> ConformanceError {
        let start = self
            .path
            .iter()
            .position(|&i| i == index)
            .unwrap_or_default();
        let tests = self.registry.descriptors();
        let path = self.path[start..]
            .iter()
            .chain(std::iter::once(&index))
            .map(|&i| tests[i].name().to_string())
            .collect();
        ConformanceError::CircularDependency { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticTest;
    use rdm_conformance_protocol::Uid;
    use std::time::Duration;

    fn device() -> DeviceTarget {
        DeviceTarget {
            universe: 1,
            uid: Uid::new(0x7a70, 1),
            broadcast_write_delay: Duration::ZERO,
        }
    }

    fn test(name: &str, requires: &[&'static str]) -> TestDescriptor {
        let requires = requires.to_vec();
        TestDescriptor::new(name, move |_| StaticTest::passing().requiring(requires.clone()))
    }

    fn registry(descriptors: Vec<TestDescriptor>) -> TestRegistry {
        let mut registry = TestRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor).unwrap();
        }
        registry
    }

    fn names(graph: &DependencyGraph, ids: &BTreeSet<InstanceId>) -> Vec<String> {
        let mut names: Vec<String> = ids
            .iter()
            .map(|id| graph.instance(*id).name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_resolve_chain() {
        let registry = registry(vec![
            test("A", &[]).provides(["p1"]),
            test("B", &["p1"]).provides(["p2"]),
            test("C", &["p2"]),
        ]);
        let device = device();
        let graph = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap();

        assert_eq!(graph.len(), 3);
        let b = graph.find("B").unwrap();
        let c = graph.find("C").unwrap();
        assert_eq!(names(&graph, graph.dependencies(b)), vec!["A"]);
        assert_eq!(names(&graph, graph.dependencies(c)), vec!["B"]);
        assert_eq!(graph.instance(c).requires(), ["p2"]);
    }

    #[test]
    fn test_selection_pulls_in_dependencies() {
        let registry = registry(vec![
            test("A", &[]).provides(["p1"]),
            test("B", &["p1"]).provides(["p2"]),
            test("C", &["p2"]),
            test("D", &[]),
        ]);
        let device = device();
        let graph = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::named(["C", "Missing"]))
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert!(graph.find("A").is_some());
        assert!(graph.find("D").is_none());
    }

    #[test]
    fn test_diamond_shares_instance() {
        let registry = registry(vec![
            test("D", &[]).provides(["d"]),
            test("A", &["d"]).provides(["a"]),
            test("B", &[]).depends_on(["D"]).provides(["b"]),
            test("C", &["a", "b"]),
        ]);
        let device = device();
        let graph = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::named(["C"]))
            .unwrap();

        assert_eq!(graph.len(), 4);
        let d = graph.find("D").unwrap();
        let a = graph.find("A").unwrap();
        let b = graph.find("B").unwrap();
        assert!(graph.dependencies(a).contains(&d));
        assert!(graph.dependencies(b).contains(&d));
        assert_eq!(
            graph
                .ids()
                .filter(|id| graph.instance(*id).name() == "D")
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_property() {
        let registry = registry(vec![test("A", &["nobody_provides_this"])]);
        let device = device();
        let err = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap_err();
        assert_eq!(
            err,
            ConformanceError::MissingProperty {
                property: "nobody_provides_this".to_string(),
                test: "A".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_static_dependency() {
        let registry = registry(vec![test("A", &[]).depends_on(["Ghost"])]);
        let device = device();
        let err = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap_err();
        assert_eq!(
            err,
            ConformanceError::UnknownDependency {
                test: "A".to_string(),
                dependency: "Ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_requires_static_dep_cycle() {
        let registry = registry(vec![
            test("A", &["p_b"]).provides(["p_a"]),
            test("B", &[]).provides(["p_b"]).depends_on(["A"]),
        ]);
        let device = device();
        let err = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap_err();
        assert_eq!(
            err,
            ConformanceError::CircularDependency {
                path: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            }
        );
    }

    #[test]
    fn test_self_requirement_is_a_cycle() {
        let registry = registry(vec![test("A", &["p"]).provides(["p"])]);
        let device = device();
        let err = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap_err();
        assert!(matches!(err, ConformanceError::CircularDependency { .. }));
    }

    #[test]
    fn test_longer_cycle_reports_only_the_loop() {
        let registry = registry(vec![
            test("Root", &["p_x"]),
            test("X", &["p_y"]).provides(["p_x"]),
            test("Y", &[]).provides(["p_y"]).depends_on(["X"]),
        ]);
        let device = device();
        let err = DependencyResolver::new(&registry, &device)
            .resolve(&Selection::All)
            .unwrap_err();
        assert_eq!(
            err,
            ConformanceError::CircularDependency {
                path: vec!["X".to_string(), "Y".to_string(), "X".to_string()],
            }
        );
    }
}
