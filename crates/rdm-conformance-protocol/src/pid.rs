use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const QUEUED_MESSAGE: &str = "QUEUED_MESSAGE";
pub const STATUS_MESSAGES: &str = "STATUS_MESSAGES";

/// Parameter identifier carried in every RDM request and response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u16);

impl Pid {
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidDefinition {
    pub name: String,
    pub value: Pid,
}

/// Lookup from symbolic parameter names to their numeric identifiers.
pub trait PidStore: Send + Sync {
    fn lookup(&self, name: &str) -> Option<PidDefinition>;

    fn name_of(&self, pid: Pid) -> Option<String>;

    /// Like [`lookup`](Self::lookup) but a missing name is an error.
    fn require(&self, name: &str) -> Result<PidDefinition> {
        self.lookup(name)
            .ok_or_else(|| ProtocolError::UnknownPid(name.to_string()))
    }
}

const STANDARD_PIDS: &[(&str, u16)] = &[
    ("DISC_UNIQUE_BRANCH", 0x0001),
    ("DISC_MUTE", 0x0002),
    ("DISC_UN_MUTE", 0x0003),
    ("PROXIED_DEVICES", 0x0010),
    ("PROXIED_DEVICE_COUNT", 0x0011),
    ("COMMS_STATUS", 0x0015),
    (QUEUED_MESSAGE, 0x0020),
    (STATUS_MESSAGES, 0x0030),
    ("STATUS_ID_DESCRIPTION", 0x0031),
    ("CLEAR_STATUS_ID", 0x0032),
    ("SUB_DEVICE_STATUS_REPORT_THRESHOLD", 0x0033),
    ("SUPPORTED_PARAMETERS", 0x0050),
    ("PARAMETER_DESCRIPTION", 0x0051),
    ("DEVICE_INFO", 0x0060),
    ("PRODUCT_DETAIL_ID_LIST", 0x0070),
    ("DEVICE_MODEL_DESCRIPTION", 0x0080),
    ("MANUFACTURER_LABEL", 0x0081),
    ("DEVICE_LABEL", 0x0082),
    ("FACTORY_DEFAULTS", 0x0090),
    ("LANGUAGE_CAPABILITIES", 0x00a0),
    ("LANGUAGE", 0x00b0),
    ("SOFTWARE_VERSION_LABEL", 0x00c0),
    ("BOOT_SOFTWARE_VERSION_ID", 0x00c1),
    ("BOOT_SOFTWARE_VERSION_LABEL", 0x00c2),
    ("DMX_PERSONALITY", 0x00e0),
    ("DMX_PERSONALITY_DESCRIPTION", 0x00e1),
    ("DMX_START_ADDRESS", 0x00f0),
    ("IDENTIFY_DEVICE", 0x1000),
    ("RESET_DEVICE", 0x1001),
];

/// In-memory [`PidStore`], pre-populated with the standard E1.20 parameters.
#[derive(Debug, Clone)]
pub struct PidRegistry {
    by_name: HashMap<String, Pid>,
    by_value: HashMap<Pid, String>,
}

impl PidRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
            by_value: HashMap::new(),
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (name, value) in STANDARD_PIDS {
            registry
                .by_name
                .insert((*name).to_string(), Pid(*value));
            registry.by_value.insert(Pid(*value), (*name).to_string());
        }
        registry
    }

    /// Adds a manufacturer-specific parameter.
    pub fn register(&mut self, name: impl Into<String>, value: u16) -> Result<()> {
        let name = name.into();
        if self.by_name.contains_key(&name) || self.by_value.contains_key(&Pid(value)) {
            return Err(ProtocolError::DuplicatePid { name, value });
        }
        self.by_name.insert(name.clone(), Pid(value));
        self.by_value.insert(Pid(value), name);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Default for PidRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl PidStore for PidRegistry {
    fn lookup(&self, name: &str) -> Option<PidDefinition> {
        self.by_name.get(name).map(|value| PidDefinition {
            name: name.to_string(),
            value: *value,
        })
    }

    fn name_of(&self, pid: Pid) -> Option<String> {
        self.by_value.get(&pid).cloned()
    }
}
