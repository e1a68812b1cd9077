//! Sans-IO model of an RDM responder as seen by a conformance runner.
//!
//! This crate never touches a socket or a timer. The queued-message drain
//! automaton in [`drain`] consumes responses and returns [`drain::DrainAction`]s
//! that a runtime interprets, so the same logic runs under tokio, in a
//! deterministic test, or on an embedded controller.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod drain;
pub mod error;
pub mod pid;
pub mod response;
pub mod uid;

pub use drain::{
    DrainAction, DrainOutcome, DrainReason, DrainState, ProtocolAnomaly, QueuedMessageFetcher,
    DEFAULT_FETCH_LIMIT,
};
pub use error::{ProtocolError, Result};
pub use pid::{Pid, PidDefinition, PidRegistry, PidStore};
pub use response::{
    CommandClass, NackReason, RdmResponse, ResponseCode, ResponseType, StatusMessage, SubDevice,
};
pub use uid::Uid;
