use crate::transport::{GetRequest, RdmTransport};
use rdm_conformance_protocol::{
    DrainAction, DrainOutcome, DrainReason, DrainState, ProtocolAnomaly, QueuedMessageFetcher, Uid,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Status type argument sent with every GET QUEUED_MESSAGE.
const QUEUED_MESSAGE_STATUS_TYPE: &str = "advisory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport {
    pub outcome: DrainOutcome,
    pub fetches: u32,
    pub timers: u32,
    pub anomalies: Vec<ProtocolAnomaly>,
}

impl DrainReport {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.outcome.is_fatal()
    }
}

/// Runs [`QueuedMessageFetcher`] cycles against a real transport.
///
/// Requests are awaited one at a time and ACK_TIMER delays are awaited on the
/// tokio timer, so the runner never has more than one request in flight.
pub struct QueueDrainer {
    fetcher: QueuedMessageFetcher,
    transport: Arc<dyn RdmTransport>,
    universe: u32,
    uid: Uid,
}

impl QueueDrainer {
    #[must_use]
    pub fn new(
        fetcher: QueuedMessageFetcher,
        transport: Arc<dyn RdmTransport>,
        universe: u32,
        uid: Uid,
    ) -> Self {
        Self {
            fetcher,
            transport,
            universe,
            uid,
        }
    }

    #[must_use]
    pub fn fetcher(&self) -> &QueuedMessageFetcher {
        &self.fetcher
    }

    /// Drains the responder's queue and reports how the cycle ended.
    pub async fn fetch_all_messages(&mut self) -> DrainReport {
        let mut actions: VecDeque<DrainAction> = self.fetcher.fetch_all_messages().into();

        while let Some(action) = actions.pop_front() {
            match action {
                DrainAction::SendGet { sub_device, pid } => {
                    let request = GetRequest::new(self.universe, self.uid, sub_device, pid)
                        .with_arg(QUEUED_MESSAGE_STATUS_TYPE);
                    let next = match self.transport.get(request).await {
                        Ok(response) => self.fetcher.handle_response(&response),
                        Err(e) => self.fetcher.handle_transport_failure(&e.to_string()),
                    };
                    actions.extend(next);
                }
                DrainAction::ScheduleTimer { delay_ms } => {
                    tokio::time::sleep(Duration::from_millis(u64::from(delay_ms))).await;
                    actions.extend(self.fetcher.handle_timer());
                }
                DrainAction::Complete(outcome) => return self.report(outcome),
            }
        }

        let outcome = match self.fetcher.state() {
            DrainState::Drained(reason) => DrainOutcome::Drained(reason),
            DrainState::Aborted => DrainOutcome::LoopLimitExceeded {
                limit: self.fetcher.limit(),
            },
            state => {
                warn!(?state, "Queued message fetch stopped without finishing");
                DrainOutcome::Drained(DrainReason::TransportFailure)
            }
        };
        self.report(outcome)
    }

    fn report(&self, outcome: DrainOutcome) -> DrainReport {
        debug!(
            ?outcome,
            fetches = self.fetcher.fetch_count(),
            timers = self.fetcher.timer_count(),
            "Queued message fetch complete"
        );
        DrainReport {
            outcome,
            fetches: self.fetcher.fetch_count(),
            timers: self.fetcher.timer_count(),
            anomalies: self.fetcher.anomalies().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::ScriptedTransport;
    use rdm_conformance_protocol::{
        CommandClass, Pid, PidRegistry, RdmResponse, SubDevice, DEFAULT_FETCH_LIMIT,
    };

    const QUEUED: Pid = Pid(0x0020);
    const STATUS: Pid = Pid(0x0030);

    fn drainer(transport: &Arc<ScriptedTransport>, limit: u32) -> QueueDrainer {
        let fetcher = QueuedMessageFetcher::new(&PidRegistry::standard())
            .unwrap()
            .with_limit(limit);
        QueueDrainer::new(fetcher, transport.clone(), 3, Uid::new(0x7a70, 0x10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_then_empty_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.extend([
            RdmResponse::ack_timer(QUEUED, 50),
            RdmResponse::ack_timer(QUEUED, 50),
            RdmResponse::status_messages(STATUS, Vec::new()),
        ]);
        let mut drainer = drainer(&transport, DEFAULT_FETCH_LIMIT);

        let start = tokio::time::Instant::now();
        let report = drainer.fetch_all_messages().await;

        assert_eq!(
            report.outcome,
            DrainOutcome::Drained(DrainReason::EmptyStatusMessages)
        );
        assert_eq!(report.fetches, 3);
        assert_eq!(report.timers, 2);
        assert_eq!(transport.request_count(), 3);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_requests_target_root_device() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut drainer = drainer(&transport, DEFAULT_FETCH_LIMIT);

        let report = drainer.fetch_all_messages().await;
        assert_eq!(report.outcome, DrainOutcome::Drained(DrainReason::UnknownPid));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].universe, 3);
        assert_eq!(requests[0].uid, Uid::new(0x7a70, 0x10));
        assert_eq!(requests[0].sub_device, SubDevice::ROOT);
        assert_eq!(requests[0].pid, QUEUED);
        assert_eq!(requests[0].args, vec!["advisory".to_string()]);
    }

    #[tokio::test]
    async fn test_endless_messages_abort_at_limit() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .with_fallback(Ok(RdmResponse::ack(CommandClass::Get, Pid(0x00f0)))),
        );
        let mut drainer = drainer(&transport, DEFAULT_FETCH_LIMIT);

        let report = drainer.fetch_all_messages().await;
        assert_eq!(
            report.outcome,
            DrainOutcome::LoopLimitExceeded { limit: 25 }
        );
        assert!(report.is_fatal());
        assert_eq!(transport.request_count(), 25);
    }

    #[tokio::test]
    async fn test_transport_failure_counts_as_drained() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_error(TransportError::RequestFailed("no route".to_string()));
        let mut drainer = drainer(&transport, DEFAULT_FETCH_LIMIT);

        let report = drainer.fetch_all_messages().await;
        assert_eq!(
            report.outcome,
            DrainOutcome::Drained(DrainReason::TransportFailure)
        );
        assert!(!report.is_fatal());
    }

    #[tokio::test]
    async fn test_anomaly_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_response(RdmResponse::status_messages(STATUS, Vec::new()).with_queued_messages(1));
        let mut drainer = drainer(&transport, DEFAULT_FETCH_LIMIT);

        let report = drainer.fetch_all_messages().await;
        assert_eq!(
            report.anomalies,
            vec![ProtocolAnomaly::EmptyStatusWithQueuedCount { queued: 1 }]
        );
        assert!(!report.is_fatal());
    }

    #[tokio::test]
    async fn test_cycles_are_independent() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.extend([
            RdmResponse::ack(CommandClass::Get, Pid(0x00f0)),
            RdmResponse::ack(CommandClass::Get, QUEUED),
        ]);
        let mut drainer = drainer(&transport, 2);

        let first = drainer.fetch_all_messages().await;
        assert_eq!(first.outcome, DrainOutcome::Drained(DrainReason::QueueEmpty));
        assert_eq!(first.fetches, 2);

        let second = drainer.fetch_all_messages().await;
        assert_eq!(second.outcome, DrainOutcome::Drained(DrainReason::UnknownPid));
        assert_eq!(second.fetches, 1);
        assert_eq!(drainer.fetcher().state(), DrainState::Drained(DrainReason::UnknownPid));
    }
}
