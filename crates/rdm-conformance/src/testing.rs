//! In-memory collaborators for exercising the runner without hardware.

use crate::error::TransportError;
use crate::properties::PropertyValue;
use crate::test_case::{ResponderTest, TestContext, TestFuture, TestState};
use crate::transport::{GetRequest, RdmTransport, TransportFuture};
use parking_lot::Mutex;
use rdm_conformance_protocol::{CommandClass, NackReason, Pid, RdmResponse};
use std::collections::VecDeque;
use std::sync::Arc;

/// Transport that replays a scripted list of replies and records requests.
///
/// Once the script runs out it keeps answering with the fallback, which by
/// default is NR_UNKNOWN_PID to GET QUEUED_MESSAGE (a responder without a
/// message queue).
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RdmResponse, TransportError>>>,
    fallback: Result<RdmResponse, TransportError>,
    requests: Mutex<Vec<GetRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(RdmResponse::nack(
                CommandClass::Get,
                Pid(0x0020),
                NackReason::UnknownPid,
            )),
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Result<RdmResponse, TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn push_response(&self, response: RdmResponse) {
        self.script.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, error: TransportError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn extend<I>(&self, responses: I)
    where
        I: IntoIterator<Item = RdmResponse>,
    {
        self.script.lock().extend(responses.into_iter().map(Ok));
    }

    #[must_use]
    pub fn requests(&self) -> Vec<GetRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RdmTransport for ScriptedTransport {
    fn get(&self, request: GetRequest) -> TransportFuture<'_> {
        self.requests.lock().push(request);
        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        Box::pin(async move { reply })
    }
}

/// A test body with a fixed verdict that may store properties when it runs.
#[derive(Debug, Clone)]
pub struct StaticTest {
    state: TestState,
    requires: Vec<String>,
    sets: Vec<(String, PropertyValue)>,
    runs: Arc<Mutex<Vec<String>>>,
    label: Option<String>,
}

impl StaticTest {
    #[must_use]
    pub fn new(state: TestState) -> Self {
        Self {
            state,
            requires: Vec::new(),
            sets: Vec::new(),
            runs: Arc::new(Mutex::new(Vec::new())),
            label: None,
        }
    }

    #[must_use]
    pub fn passing() -> Self {
        Self::new(TestState::Passed)
    }

    #[must_use]
    pub fn requiring<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(properties.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn setting(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.sets.push((name.into(), value.into()));
        self
    }

    /// Appends `label` to `log` every time the test body runs.
    #[must_use]
    pub fn logging_to(mut self, label: impl Into<String>, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.label = Some(label.into());
        self.runs = log;
        self
    }
}

impl ResponderTest for StaticTest {
    fn requires(&self) -> Vec<String> {
        self.requires.clone()
    }

    fn run<'a>(&'a mut self, ctx: &'a mut TestContext<'_>) -> TestFuture<'a> {
        Box::pin(async move {
            if let Some(label) = &self.label {
                self.runs.lock().push(label.clone());
            }
            for (name, value) in &self.sets {
                ctx.properties.set(name.clone(), value.clone());
            }
            self.state
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdm_conformance_protocol::{SubDevice, Uid};

    #[tokio::test]
    async fn test_scripted_transport_replays_then_falls_back() {
        let transport = ScriptedTransport::new();
        transport.push_response(RdmResponse::ack_timer(Pid(0x20), 10));
        transport.push_error(TransportError::Closed);

        let request = GetRequest::new(1, Uid::new(0x7a70, 1), SubDevice::ROOT, Pid(0x20));
        let first = transport.get(request.clone()).await.unwrap();
        assert_eq!(first, RdmResponse::ack_timer(Pid(0x20), 10));
        assert_eq!(transport.get(request.clone()).await, Err(TransportError::Closed));

        let fallback = transport.get(request.clone()).await.unwrap();
        assert_eq!(fallback.nack_reason(), Some(NackReason::UnknownPid));
        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.requests()[0], request);
        assert_eq!(transport.remaining(), 0);
    }
}
