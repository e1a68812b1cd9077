use rdm_conformance_protocol::ProtocolError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConformanceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Transport closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConformanceError {
    #[error("{property} is declared in more than one test ({first} and {second})")]
    DuplicateProperty {
        property: String,
        first: String,
        second: String,
    },

    #[error("Test {0} is registered more than once")]
    DuplicateTest(String),

    #[error("{property} required by {test} is not listed in any provides list")]
    MissingProperty { property: String, test: String },

    #[error("{test} depends on unregistered test {dependency}")]
    UnknownDependency { test: String, dependency: String },

    #[error("Circular dependency found: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    #[error("Scheduling stalled with unresolved tests: {}", remaining.join(", "))]
    ScheduleStalled { remaining: Vec<String> },

    #[error("Property {0} not found")]
    PropertyNotFound(String),

    #[error("Queued message fetch hit loop limit of {limit}")]
    LoopLimitExceeded { limit: u32 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ConformanceError {
    /// Errors raised while building the run plan, before any test executes.
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateProperty { .. }
                | Self::DuplicateTest(_)
                | Self::MissingProperty { .. }
                | Self::UnknownDependency { .. }
                | Self::CircularDependency { .. }
                | Self::ScheduleStalled { .. }
        )
    }
}

impl From<toml::de::Error> for ConformanceError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for ConformanceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
