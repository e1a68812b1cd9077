use crate::properties::PropertyStore;
use crate::transport::RdmTransport;
use rdm_conformance_protocol::{PidStore, Uid};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub type TestFuture<'a> = Pin<Box<dyn Future<Output = TestState> + Send + 'a>>;

type TestFactory = Arc<dyn Fn(&DeviceTarget) -> Box<dyn ResponderTest> + Send + Sync>;

/// The responder under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub universe: u32,
    pub uid: Uid,
    /// How long to wait after a broadcast SET before checking its effect.
    pub broadcast_write_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestState {
    Passed,
    Failed,
    /// The test could not reach a verdict, e.g. the responder sent garbage.
    Broken,
    NotRun,
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Broken => "Broken",
            Self::NotRun => "Not Run",
        };
        f.write_str(s)
    }
}

/// Everything a running test may touch.
pub struct TestContext<'a> {
    pub device: &'a DeviceTarget,
    pub properties: &'a mut PropertyStore,
    pub transport: &'a dyn RdmTransport,
    pub pids: &'a dyn PidStore,
}

/// A single conformance check against a responder.
pub trait ResponderTest: Send {
    /// Properties that must be in the [`PropertyStore`] before this test runs.
    ///
    /// Called once when the test is instantiated; the answer is used both to
    /// build the dependency graph and to decide whether to skip the test.
    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    fn run<'a>(&'a mut self, ctx: &'a mut TestContext<'_>) -> TestFuture<'a>;
}

/// Static metadata for a test type plus a factory for fresh instances.
#[derive(Clone)]
pub struct TestDescriptor {
    name: String,
    description: Option<String>,
    category: Option<String>,
    provides: Vec<String>,
    deps: Vec<String>,
    factory: TestFactory,
}

impl TestDescriptor {
    pub fn new<F, T>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&DeviceTarget) -> T + Send + Sync + 'static,
        T: ResponderTest + 'static,
    {
        let factory: TestFactory =
            Arc::new(move |device: &DeviceTarget| -> Box<dyn ResponderTest> {
                Box::new(factory(device))
            });
        Self {
            name: name.into(),
            description: None,
            category: None,
            provides: Vec::new(),
            deps: Vec::new(),
            factory,
        }
    }

    #[must_use]
    pub fn provides<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provides.extend(properties.into_iter().map(Into::into));
        self
    }

    /// Tests that must run first regardless of which properties they provide.
    #[must_use]
    pub fn depends_on<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps.extend(tests.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn provided_properties(&self) -> &[String] {
        &self.provides
    }

    #[must_use]
    pub fn static_deps(&self) -> &[String] {
        &self.deps
    }

    #[must_use]
    pub fn instantiate(&self, device: &DeviceTarget) -> Box<dyn ResponderTest> {
        (self.factory)(device)
    }
}

impl fmt::Debug for TestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("category", &self.category)
            .field("provides", &self.provides)
            .field("deps", &self.deps)
            .field("factory", &"...")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticTest;

    fn device() -> DeviceTarget {
        DeviceTarget {
            universe: 1,
            uid: Uid::new(0x7a70, 1),
            broadcast_write_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = TestDescriptor::new("GetDeviceInfo", |_| StaticTest::passing())
            .provides(["dmx_footprint", "sub_device_count"])
            .depends_on(["MuteDevice"])
            .with_description("GET device info.")
            .with_category("Product Information");

        assert_eq!(descriptor.name(), "GetDeviceInfo");
        assert_eq!(descriptor.provided_properties(), ["dmx_footprint", "sub_device_count"]);
        assert_eq!(descriptor.static_deps(), ["MuteDevice"]);
        assert_eq!(descriptor.description(), Some("GET device info."));
        assert_eq!(descriptor.category(), Some("Product Information"));
        assert!(format!("{descriptor:?}").contains("GetDeviceInfo"));
    }

    #[test]
    fn test_instantiate_uses_device() {
        let descriptor = TestDescriptor::new("NeedsFootprint", |device: &DeviceTarget| {
            assert_eq!(device.universe, 1);
            StaticTest::passing().requiring(["dmx_footprint"])
        });
        let instance = descriptor.instantiate(&device());
        assert_eq!(instance.requires(), vec!["dmx_footprint".to_string()]);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(TestState::Passed.to_string(), "Passed");
        assert_eq!(TestState::NotRun.to_string(), "Not Run");
        assert_eq!(serde_json::to_string(&TestState::NotRun).unwrap(), "\"not_run\"");
    }
}
