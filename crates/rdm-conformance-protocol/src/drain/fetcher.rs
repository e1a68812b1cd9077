use crate::error::Result;
use crate::pid::{Pid, PidStore, QUEUED_MESSAGE, STATUS_MESSAGES};
use crate::response::{CommandClass, NackReason, RdmResponse, ResponseType, SubDevice};
use tracing::{debug, error, warn};

use super::actions::{DrainAction, DrainOutcome};
use super::state::{DrainReason, DrainState, ProtocolAnomaly};

pub const DEFAULT_FETCH_LIMIT: u32 = 25;

/// Sends GET QUEUED_MESSAGE until every ACK_TIMER has expired and the
/// responder answers with an empty status message or NR_UNKNOWN_PID.
///
/// The fetch counter covers every request of a cycle, including the ones
/// issued after a timer, so a responder stuck in an ACK_TIMER loop is cut off
/// by the same limit as one that never stops reporting messages.
#[derive(Debug)]
pub struct QueuedMessageFetcher {
    state: DrainState,
    queued_message_pid: Pid,
    status_messages_pid: Pid,
    limit: u32,
    fetches: u32,
    timers: u32,
    outstanding: bool,
    anomalies: Vec<ProtocolAnomaly>,
}

impl QueuedMessageFetcher {
    pub fn new(pids: &dyn PidStore) -> Result<Self> {
        Ok(Self {
            state: DrainState::Idle,
            queued_message_pid: pids.require(QUEUED_MESSAGE)?.value,
            status_messages_pid: pids.require(STATUS_MESSAGES)?.value,
            limit: DEFAULT_FETCH_LIMIT,
            fetches: 0,
            timers: 0,
            outstanding: false,
            anomalies: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn state(&self) -> DrainState {
        self.state
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn fetch_count(&self) -> u32 {
        self.fetches
    }

    #[must_use]
    pub fn timer_count(&self) -> u32 {
        self.timers
    }

    #[must_use]
    pub fn has_outstanding_request(&self) -> bool {
        self.outstanding
    }

    #[must_use]
    pub fn anomalies(&self) -> &[ProtocolAnomaly] {
        &self.anomalies
    }

    #[must_use]
    pub fn queued_message_pid(&self) -> Pid {
        self.queued_message_pid
    }

    #[must_use]
    pub fn status_messages_pid(&self) -> Pid {
        self.status_messages_pid
    }

    /// Starts a new drain cycle. Counters and anomalies from the previous
    /// cycle are discarded.
    #[must_use]
    pub fn fetch_all_messages(&mut self) -> Vec<DrainAction> {
        self.fetches = 0;
        self.timers = 0;
        self.outstanding = false;
        self.anomalies.clear();
        self.state = DrainState::Fetching;
        self.fetch_queued_message()
    }

    /// The flow-control delay requested by the last ACK_TIMER has elapsed.
    #[must_use]
    pub fn handle_timer(&mut self) -> Vec<DrainAction> {
        if !matches!(self.state, DrainState::AwaitingTimer { .. }) {
            warn!(state = ?self.state, "Ignoring queued message timer outside AwaitingTimer");
            return Vec::new();
        }
        self.fetch_queued_message()
    }

    #[must_use]
    pub fn handle_transport_failure(&mut self, reason: &str) -> Vec<DrainAction> {
        if !self.take_outstanding() {
            warn!("Ignoring transport failure with no outstanding request: {reason}");
            return Vec::new();
        }
        error!("Error: {reason}");
        self.finish(DrainReason::TransportFailure)
    }

    #[must_use]
    pub fn handle_response(&mut self, response: &RdmResponse) -> Vec<DrainAction> {
        if !self.take_outstanding() {
            warn!(pid = %response.pid, "Ignoring response with no outstanding request");
            return Vec::new();
        }

        if !response.response_code.is_ok() {
            error!("Error: {}", response.response_code.as_str());
            return self.finish(DrainReason::ErrorResponse(response.response_code));
        }

        let is_get = response.command_class == CommandClass::Get;
        match response.response_type {
            ResponseType::AckTimer { delay_ms } => {
                debug!("Got ACK TIMER set to {delay_ms} ms");
                self.timers += 1;
                self.state = DrainState::AwaitingTimer { delay_ms };
                vec![DrainAction::schedule_timer(delay_ms)]
            }
            ResponseType::NackReason(NackReason::UnknownPid)
                if is_get && response.pid == self.queued_message_pid =>
            {
                self.finish(DrainReason::UnknownPid)
            }
            ResponseType::Ack if is_get && response.pid == self.queued_message_pid => {
                self.finish(DrainReason::QueueEmpty)
            }
            ResponseType::Ack
                if is_get
                    && response.pid == self.status_messages_pid
                    && response.messages().is_empty() =>
            {
                if response.queued_messages > 0 {
                    let anomaly = ProtocolAnomaly::EmptyStatusWithQueuedCount {
                        queued: response.queued_messages,
                    };
                    error!("Got a {anomaly}");
                    self.anomalies.push(anomaly);
                }
                self.finish(DrainReason::EmptyStatusMessages)
            }
            _ => {
                debug!(pid = %response.pid, "Queued message received, more remain");
                self.fetch_queued_message()
            }
        }
    }

    fn fetch_queued_message(&mut self) -> Vec<DrainAction> {
        if self.fetches >= self.limit {
            error!("Queued message hit loop limit of {}", self.fetches);
            self.state = DrainState::Aborted;
            return vec![DrainAction::Complete(DrainOutcome::LoopLimitExceeded {
                limit: self.limit,
            })];
        }

        self.fetches += 1;
        self.outstanding = true;
        self.state = DrainState::Fetching;
        vec![DrainAction::send_get(
            SubDevice::ROOT,
            self.queued_message_pid,
        )]
    }

    fn take_outstanding(&mut self) -> bool {
        std::mem::replace(&mut self.outstanding, false)
    }

    fn finish(&mut self, reason: DrainReason) -> Vec<DrainAction> {
        self.state = DrainState::Drained(reason);
        vec![DrainAction::Complete(DrainOutcome::Drained(reason))]
    }
}
