#![allow(dead_code)]

use parking_lot::Mutex;
pub use rdm_conformance::testing::{ScriptedTransport, StaticTest};
use rdm_conformance::{RunnerConfig, TestDescriptor, TestRunner};
use rdm_conformance_protocol::{PidRegistry, Uid};
use std::sync::Arc;

pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn config() -> RunnerConfig {
    RunnerConfig::new(1, Uid::new(0x7a70, 0x0000_0001))
}

pub fn runner(transport: &Arc<ScriptedTransport>) -> TestRunner {
    runner_with(config(), transport)
}

pub fn runner_with(config: RunnerConfig, transport: &Arc<ScriptedTransport>) -> TestRunner {
    init_tracing();
    TestRunner::new(config, transport.clone(), Arc::new(PidRegistry::standard()))
        .expect("runner construction")
}

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A passing test that records its name in `log` when it runs.
pub fn logged(name: &'static str, log: &RunLog) -> TestDescriptor {
    logged_with(name, log, |test| test)
}

pub fn logged_with<F>(name: &'static str, log: &RunLog, configure: F) -> TestDescriptor
where
    F: Fn(StaticTest) -> StaticTest + Send + Sync + 'static,
{
    let log = Arc::clone(log);
    TestDescriptor::new(name, move |_| {
        configure(StaticTest::passing().logging_to(name, Arc::clone(&log)))
    })
}
