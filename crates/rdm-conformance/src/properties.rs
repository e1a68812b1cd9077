//! Device properties gathered while the suite runs.
//!
//! One [`PropertyStore`] is shared by every test of a run. A test that
//! provides `dmx_footprint` stores it here and later tests read it back
//! instead of asking the responder again.

use crate::error::{ConformanceError, Result};
use rdm_conformance_protocol::{Pid, Uid};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    #[serde(rename = "uint")]
    UInt(u64),
    Text(String),
    Bytes(Vec<u8>),
    Uid(Uid),
    Pid(Pid),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    #[must_use]
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PropertyValue>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_uid(&self) -> Option<Uid> {
        match self {
            Self::Uid(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pid(&self) -> Option<Pid> {
        match self {
            Self::Pid(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for PropertyValue {
    fn from(v: u8) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u16> for PropertyValue {
    fn from(v: u16) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Uid> for PropertyValue {
    fn from(v: Uid) -> Self {
        Self::Uid(v)
    }
}

impl From<Pid> for PropertyValue {
    fn from(v: Pid) -> Self {
        Self::Pid(v)
    }
}

/// Name to value mapping shared by all tests of one run.
///
/// Values may be overwritten, which is logged, but are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    declared: BTreeSet<String>,
    values: BTreeMap<String, PropertyValue>,
}

impl PropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that knows which names some registered test provides.
    /// Setting any other name still works but is logged.
    #[must_use]
    pub fn with_declared<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: names.into_iter().map(Into::into).collect(),
            values: BTreeMap::new(),
        }
    }

    /// Stores `value`, returning the value it replaced.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let name = name.into();
        if !self.declared.is_empty() && !self.declared.contains(&name) {
            warn!("Property {name} is not provided by any registered test");
        }
        let value = value.into();
        match self.values.entry(name) {
            Entry::Occupied(mut entry) => {
                warn!("Multiple sets of property {}", entry.key());
                Some(entry.insert(value))
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&PropertyValue> {
        self.get(name)
            .ok_or_else(|| ConformanceError::PropertyNotFound(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, PropertyValue> {
        self.values.clone()
    }
}
