//! Runs a selection of registered tests against one responder.

use crate::config::RunnerConfig;
use crate::drainer::QueueDrainer;
use crate::error::{ConformanceError, Result};
use crate::properties::PropertyStore;
use crate::registry::TestRegistry;
use crate::resolver::{DependencyResolver, Selection};
use crate::result::{RunResult, TestRecord};
use crate::scheduler::schedule;
use crate::test_case::{DeviceTarget, TestContext, TestDescriptor};
use crate::transport::RdmTransport;
use rdm_conformance_protocol::{DrainOutcome, PidStore, QueuedMessageFetcher};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use ulid::Ulid;

pub struct TestRunner {
    config: RunnerConfig,
    device: DeviceTarget,
    registry: TestRegistry,
    pids: Arc<dyn PidStore>,
    transport: Arc<dyn RdmTransport>,
    drainer: QueueDrainer,
}

impl TestRunner {
    pub fn new(
        config: RunnerConfig,
        transport: Arc<dyn RdmTransport>,
        pids: Arc<dyn PidStore>,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher =
            QueuedMessageFetcher::new(pids.as_ref())?.with_limit(config.queued_message_limit);
        let drainer = QueueDrainer::new(
            fetcher,
            Arc::clone(&transport),
            config.universe,
            config.uid,
        );
        Ok(Self {
            device: config.device_target(),
            config,
            registry: TestRegistry::new(),
            pids,
            transport,
            drainer,
        })
    }

    pub fn register_test(&mut self, descriptor: TestDescriptor) -> Result<()> {
        self.registry.register(descriptor)
    }

    #[must_use]
    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Resolves, orders and runs the selected tests.
    ///
    /// Errors in the test graph are returned before anything is sent to the
    /// responder. Hitting the queued-message loop limit stops the run and is
    /// reported through [`RunResult::aborted`] together with the tests that
    /// already ran.
    pub async fn run_tests(&mut self, selection: &Selection) -> Result<RunResult> {
        let run_id = Ulid::new();
        let span = info_span!("run_tests", %run_id, uid = %self.config.uid);
        self.execute(run_id, selection).instrument(span).await
    }

    async fn execute(&mut self, run_id: Ulid, selection: &Selection) -> Result<RunResult> {
        let mut properties = PropertyStore::with_declared(self.registry.declared_properties());
        let mut graph = DependencyResolver::new(&self.registry, &self.device).resolve(selection)?;
        let order = schedule(&graph)?;

        debug!(
            "Test order is {}",
            order
                .iter()
                .map(|id| graph.instance(*id).name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut records = Vec::with_capacity(order.len());
        let mut aborted = None;

        for id in order {
            let report = self.drainer.fetch_all_messages().await;
            if let DrainOutcome::LoopLimitExceeded { limit } = report.outcome {
                aborted = Some(ConformanceError::LoopLimitExceeded { limit });
                break;
            }

            let instance = graph.instance_mut(id);
            let name = instance.name().to_string();
            let category = instance.descriptor().category().map(str::to_string);
            if let Some(description) = instance.descriptor().description() {
                debug!("{name}: {description}");
            }

            let missing = instance
                .requires()
                .iter()
                .find(|property| !properties.contains(property.as_str()))
                .cloned();
            if let Some(property) = missing {
                info!("{name}: Property: {property} not found, skipping test.");
                records.push(TestRecord::skipped(name, category, property));
                continue;
            }

            let mut ctx = TestContext {
                device: &self.device,
                properties: &mut properties,
                transport: self.transport.as_ref(),
                pids: self.pids.as_ref(),
            };
            let state = instance.run(&mut ctx).await;
            info!("{name}: {state}");
            records.push(TestRecord::executed(name, category, state));
        }

        Ok(RunResult {
            run_id,
            records,
            properties,
            aborted,
        })
    }
}
