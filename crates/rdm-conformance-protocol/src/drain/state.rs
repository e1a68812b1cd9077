use crate::response::ResponseCode;
use std::fmt;

/// Why a drain cycle decided the queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainReason {
    /// The request never completed; we stop polling rather than spin.
    TransportFailure,
    ErrorResponse(ResponseCode),
    /// ACK to the GET QUEUED_MESSAGE itself.
    QueueEmpty,
    /// NR_UNKNOWN_PID to GET QUEUED_MESSAGE: the responder has no queue.
    UnknownPid,
    /// ACK carrying a STATUS_MESSAGES payload with no entries.
    EmptyStatusMessages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrainState {
    #[default]
    Idle,
    Fetching,
    AwaitingTimer {
        delay_ms: u32,
    },
    Drained(DrainReason),
    Aborted,
}

impl DrainState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Drained(_) | Self::Aborted)
    }
}

/// Responder behaviour that breaks the protocol without breaking the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolAnomaly {
    EmptyStatusWithQueuedCount { queued: u8 },
}

impl fmt::Display for ProtocolAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyStatusWithQueuedCount { queued } => write!(
                f,
                "empty status message but the queued message count is {queued}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_state_default() {
        assert_eq!(DrainState::default(), DrainState::Idle);
        assert!(!DrainState::Fetching.is_terminal());
        assert!(!DrainState::AwaitingTimer { delay_ms: 10 }.is_terminal());
        assert!(DrainState::Drained(DrainReason::QueueEmpty).is_terminal());
        assert!(DrainState::Aborted.is_terminal());
    }

    #[test]
    fn test_anomaly_display() {
        let anomaly = ProtocolAnomaly::EmptyStatusWithQueuedCount { queued: 4 };
        assert_eq!(
            anomaly.to_string(),
            "empty status message but the queued message count is 4"
        );
    }
}
