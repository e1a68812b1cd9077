//! Dependency-aware conformance runner for RDM responders.
//!
//! Tests are registered as [`TestDescriptor`]s that declare the device
//! properties they provide and the tests they depend on. A run resolves the
//! requested tests plus everything they pull in, orders them so producers
//! run before consumers, and executes them one at a time. Before each test
//! the responder's queued-message backlog is drained so that a stale message
//! from a previous test never answers the next one.
//!
//! ```rust,no_run
//! use rdm_conformance::testing::ScriptedTransport;
//! use rdm_conformance::{RunnerConfig, Selection, TestRunner};
//! use rdm_conformance_protocol::{PidRegistry, Uid};
//! use std::sync::Arc;
//!
//! # async fn example() -> rdm_conformance::Result<()> {
//! let config = RunnerConfig::new(1, Uid::new(0x7a70, 1));
//! let transport = Arc::new(ScriptedTransport::new());
//! let mut runner = TestRunner::new(config, transport, Arc::new(PidRegistry::standard()))?;
//! let result = runner.run_tests(&Selection::All).await?;
//! println!("{:?}", result.summary());
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod drainer;
pub mod error;
pub mod properties;
pub mod registry;
pub mod resolver;
pub mod result;
pub mod runner;
pub mod scheduler;
pub mod test_case;
pub mod testing;
pub mod transport;

pub use config::RunnerConfig;
pub use drainer::{DrainReport, QueueDrainer};
pub use error::{ConformanceError, Result, TransportError};
pub use properties::{PropertyStore, PropertyValue};
pub use registry::TestRegistry;
pub use resolver::{DependencyGraph, DependencyResolver, InstanceId, Selection, TestInstance};
pub use result::{RunResult, RunSummary, TestRecord};
pub use runner::TestRunner;
pub use scheduler::schedule;
pub use test_case::{DeviceTarget, ResponderTest, TestContext, TestDescriptor, TestFuture, TestState};
pub use transport::{GetRequest, RdmTransport, TransportFuture};
