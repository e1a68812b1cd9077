//! Queued-message drain automaton.
//!
//! Before every test the runner empties the responder's queued-message
//! backlog by sending GET QUEUED_MESSAGE until one of the terminal responses
//! arrives. Queued messages show up for several reasons: an inline proxy
//! answering with ACK_TIMER to buy itself time, a state change made on the
//! responder's front panel, or a SET whose reply was delayed by a slow write
//! to persistent storage. ACK_TIMERs from a proxy and from the responder look
//! identical on the wire, so the automaton treats them the same way.

pub mod actions;
pub mod fetcher;
pub mod state;

pub use actions::{DrainAction, DrainOutcome};
pub use fetcher::{QueuedMessageFetcher, DEFAULT_FETCH_LIMIT};
pub use state::{DrainReason, DrainState, ProtocolAnomaly};
