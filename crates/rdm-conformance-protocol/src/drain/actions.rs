use crate::pid::Pid;
use crate::response::SubDevice;

use super::state::DrainReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Drained(DrainReason),
    /// The responder kept reporting pending messages past the fetch limit.
    LoopLimitExceeded { limit: u32 },
}

impl DrainOutcome {
    /// A fatal outcome stops the whole run, not just this cycle.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LoopLimitExceeded { .. })
    }
}

/// Work the runtime must perform on behalf of the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainAction {
    SendGet { sub_device: SubDevice, pid: Pid },
    ScheduleTimer { delay_ms: u32 },
    Complete(DrainOutcome),
}

impl DrainAction {
    #[must_use]
    pub fn send_get(sub_device: SubDevice, pid: Pid) -> Self {
        Self::SendGet { sub_device, pid }
    }

    #[must_use]
    pub fn schedule_timer(delay_ms: u32) -> Self {
        Self::ScheduleTimer { delay_ms }
    }

    #[must_use]
    pub fn is_send_get(&self) -> bool {
        matches!(self, Self::SendGet { .. })
    }

    #[must_use]
    pub fn outcome(&self) -> Option<DrainOutcome> {
        match self {
            Self::Complete(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_constructors() {
        let action = DrainAction::send_get(SubDevice::ROOT, Pid(0x20));
        assert!(action.is_send_get());
        assert_eq!(action.outcome(), None);

        let action = DrainAction::schedule_timer(250);
        match action {
            DrainAction::ScheduleTimer { delay_ms } => assert_eq!(delay_ms, 250),
            _ => panic!("Expected ScheduleTimer"),
        }
    }

    #[test]
    fn test_only_loop_limit_is_fatal() {
        assert!(DrainOutcome::LoopLimitExceeded { limit: 25 }.is_fatal());
        assert!(!DrainOutcome::Drained(DrainReason::QueueEmpty).is_fatal());
        assert!(!DrainOutcome::Drained(DrainReason::TransportFailure).is_fatal());
    }
}
