use crate::error::{ConformanceError, Result};
use crate::test_case::TestDescriptor;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Every test known to the runner, in registration order.
///
/// Registering a test does not mean it will run; a run may select a subset.
/// Each property has exactly one producer across the whole registry.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<Arc<TestDescriptor>>,
    by_name: HashMap<String, usize>,
    producers: HashMap<String, usize>,
}

impl TestRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a test. On error the registry is left unchanged.
    pub fn register(&mut self, descriptor: TestDescriptor) -> Result<()> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(ConformanceError::DuplicateTest(descriptor.name().to_string()));
        }

        let mut seen = HashSet::new();
        for property in descriptor.provided_properties() {
            if let Some(&index) = self.producers.get(property) {
                return Err(ConformanceError::DuplicateProperty {
                    property: property.clone(),
                    first: self.tests[index].name().to_string(),
                    second: descriptor.name().to_string(),
                });
            }
            if !seen.insert(property) {
                return Err(ConformanceError::DuplicateProperty {
                    property: property.clone(),
                    first: descriptor.name().to_string(),
                    second: descriptor.name().to_string(),
                });
            }
        }

        let index = self.tests.len();
        for property in descriptor.provided_properties() {
            self.producers.insert(property.clone(), index);
        }
        self.by_name.insert(descriptor.name().to_string(), index);
        self.tests.push(Arc::new(descriptor));
        Ok(())
    }

    #[must_use]
    pub fn descriptors(&self) -> &[Arc<TestDescriptor>] {
        &self.tests
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<TestDescriptor>> {
        self.index_of(name).map(|index| &self.tests[index])
    }

    /// Registration position of the named test.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Registration position of the test that provides `property`.
    #[must_use]
    pub fn producer_of(&self, property: &str) -> Option<usize> {
        self.producers.get(property).copied()
    }

    pub fn declared_properties(&self) -> impl Iterator<Item = &str> {
        self.producers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
