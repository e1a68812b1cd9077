use crate::pid::Pid;
use serde::{Deserialize, Serialize};

/// Addressable unit inside a responder. Queued messages live on the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubDevice(pub u16);

impl SubDevice {
    pub const ROOT: Self = Self(0);
    pub const ALL: Self = Self(0xffff);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandClass {
    Discovery,
    Get,
    Set,
}

/// Outcome of a request that made it through the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    CompletedOk,
    WasBroadcast,
    FailedToSend,
    Timeout,
    InvalidResponse,
    UnknownUid,
    ChecksumIncorrect,
    TransactionMismatch,
    SubDeviceMismatch,
    DeviceMismatch,
    InvalidCommandClass,
    PidMismatch,
    PacketTooShort,
    DuplicateResponse,
}

impl ResponseCode {
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::CompletedOk)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompletedOk => "Ok",
            Self::WasBroadcast => "Request was broadcast",
            Self::FailedToSend => "Failed to send request",
            Self::Timeout => "Response timeout",
            Self::InvalidResponse => "Invalid response",
            Self::UnknownUid => "Unknown UID",
            Self::ChecksumIncorrect => "Incorrect checksum",
            Self::TransactionMismatch => "Transaction number mismatch",
            Self::SubDeviceMismatch => "Sub device mismatch",
            Self::DeviceMismatch => "Device mismatch",
            Self::InvalidCommandClass => "Invalid command class",
            Self::PidMismatch => "PID mismatch",
            Self::PacketTooShort => "Packet too short",
            Self::DuplicateResponse => "Duplicate response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NackReason {
    UnknownPid,
    FormatError,
    HardwareFault,
    ProxyReject,
    WriteProtect,
    UnsupportedCommandClass,
    DataOutOfRange,
    BufferFull,
    PacketSizeUnsupported,
    SubDeviceOutOfRange,
    ProxyBufferFull,
    Other(u16),
}

impl From<u16> for NackReason {
    fn from(code: u16) -> Self {
        match code {
            0x0000 => Self::UnknownPid,
            0x0001 => Self::FormatError,
            0x0002 => Self::HardwareFault,
            0x0003 => Self::ProxyReject,
            0x0004 => Self::WriteProtect,
            0x0005 => Self::UnsupportedCommandClass,
            0x0006 => Self::DataOutOfRange,
            0x0007 => Self::BufferFull,
            0x0008 => Self::PacketSizeUnsupported,
            0x0009 => Self::SubDeviceOutOfRange,
            0x000a => Self::ProxyBufferFull,
            other => Self::Other(other),
        }
    }
}

impl From<NackReason> for u16 {
    fn from(reason: NackReason) -> Self {
        match reason {
            NackReason::UnknownPid => 0x0000,
            NackReason::FormatError => 0x0001,
            NackReason::HardwareFault => 0x0002,
            NackReason::ProxyReject => 0x0003,
            NackReason::WriteProtect => 0x0004,
            NackReason::UnsupportedCommandClass => 0x0005,
            NackReason::DataOutOfRange => 0x0006,
            NackReason::BufferFull => 0x0007,
            NackReason::PacketSizeUnsupported => 0x0008,
            NackReason::SubDeviceOutOfRange => 0x0009,
            NackReason::ProxyBufferFull => 0x000a,
            NackReason::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    Ack,
    /// The responder (or a proxy in front of it) asks us to come back later.
    AckTimer {
        delay_ms: u32,
    },
    NackReason(NackReason),
    AckOverflow,
}

/// One entry of a STATUS_MESSAGES payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub sub_device: u16,
    pub status_type: u8,
    pub message_id: u16,
    pub data_value1: i16,
    pub data_value2: i16,
}

/// A completed RDM response together with its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdmResponse {
    pub response_code: ResponseCode,
    pub response_type: ResponseType,
    pub command_class: CommandClass,
    /// The parameter this response acknowledges. For GET QUEUED_MESSAGE this
    /// is the pid of whatever message the responder chose to return.
    pub pid: Pid,
    /// Message count advertised by the responder alongside the response.
    pub queued_messages: u8,
    pub status_messages: Option<Vec<StatusMessage>>,
}

impl RdmResponse {
    #[must_use]
    pub fn ack(command_class: CommandClass, pid: Pid) -> Self {
        Self {
            response_code: ResponseCode::CompletedOk,
            response_type: ResponseType::Ack,
            command_class,
            pid,
            queued_messages: 0,
            status_messages: None,
        }
    }

    #[must_use]
    pub fn ack_timer(pid: Pid, delay_ms: u32) -> Self {
        Self {
            response_type: ResponseType::AckTimer { delay_ms },
            ..Self::ack(CommandClass::Get, pid)
        }
    }

    #[must_use]
    pub fn nack(command_class: CommandClass, pid: Pid, reason: NackReason) -> Self {
        Self {
            response_type: ResponseType::NackReason(reason),
            ..Self::ack(command_class, pid)
        }
    }

    #[must_use]
    pub fn status_messages(pid: Pid, messages: Vec<StatusMessage>) -> Self {
        Self {
            status_messages: Some(messages),
            ..Self::ack(CommandClass::Get, pid)
        }
    }

    #[must_use]
    pub fn failed(response_code: ResponseCode, pid: Pid) -> Self {
        Self {
            response_code,
            ..Self::ack(CommandClass::Get, pid)
        }
    }

    #[must_use]
    pub fn with_queued_messages(mut self, count: u8) -> Self {
        self.queued_messages = count;
        self
    }

    #[must_use]
    pub fn nack_reason(&self) -> Option<NackReason> {
        match self.response_type {
            ResponseType::NackReason(reason) => Some(reason),
            _ => None,
        }
    }

    /// Decoded status messages; an absent list reads as empty.
    #[must_use]
    pub fn messages(&self) -> &[StatusMessage] {
        self.status_messages.as_deref().unwrap_or_default()
    }
}
