use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unknown PID name: {0}")]
    UnknownPid(String),

    #[error("Invalid UID: {0}")]
    InvalidUid(String),

    #[error("Duplicate PID {name} (0x{value:04x})")]
    DuplicatePid { name: String, value: u16 },
}
