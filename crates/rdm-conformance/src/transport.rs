use crate::error::TransportError;
use rdm_conformance_protocol::{Pid, RdmResponse, SubDevice, Uid};
use std::future::Future;
use std::pin::Pin;

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RdmResponse, TransportError>> + Send + 'a>>;

/// A single RDM GET addressed to one responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub universe: u32,
    pub uid: Uid,
    pub sub_device: SubDevice,
    pub pid: Pid,
    /// Parameter data in symbolic form, encoded by the transport.
    pub args: Vec<String>,
}

impl GetRequest {
    #[must_use]
    pub fn new(universe: u32, uid: Uid, sub_device: SubDevice, pid: Pid) -> Self {
        Self {
            universe,
            uid,
            sub_device,
            pid,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Sends RDM requests to a responder and decodes the replies.
///
/// Each call resolves exactly once. `Err` means the request never completed;
/// a completed request with a failure code is an `Ok` response whose
/// `response_code` says so.
pub trait RdmTransport: Send + Sync {
    fn get(&self, request: GetRequest) -> TransportFuture<'_>;
}
