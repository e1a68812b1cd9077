use crate::error::ProtocolError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier of an RDM responder: a 16-bit manufacturer id plus a
/// 32-bit device id, written `mmmm:dddddddd` in hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid {
    manufacturer: u16,
    device: u32,
}

impl Uid {
    pub const BROADCAST: Self = Self::new(0xffff, 0xffff_ffff);

    #[must_use]
    pub const fn new(manufacturer: u16, device: u32) -> Self {
        Self {
            manufacturer,
            device,
        }
    }

    #[must_use]
    pub const fn manufacturer(&self) -> u16 {
        self.manufacturer
    }

    #[must_use]
    pub const fn device(&self) -> u32 {
        self.device
    }

    /// True for the all-devices and the vendorcast addresses.
    #[must_use]
    pub const fn is_broadcast(&self) -> bool {
        self.device == 0xffff_ffff
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:08x}", self.manufacturer, self.device)
    }
}

impl FromStr for Uid {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidUid(s.to_string());
        let (manufacturer, device) = s.split_once(':').ok_or_else(invalid)?;
        if manufacturer.is_empty() || manufacturer.len() > 4 || device.is_empty() || device.len() > 8
        {
            return Err(invalid());
        }
        let manufacturer = u16::from_str_radix(manufacturer, 16).map_err(|_| invalid())?;
        let device = u32::from_str_radix(device, 16).map_err(|_| invalid())?;
        Ok(Self::new(manufacturer, device))
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uid_display() {
        let uid = Uid::new(0x7a70, 1);
        assert_eq!(uid.to_string(), "7a70:00000001");
    }

    #[test]
    fn test_uid_parse() {
        let uid: Uid = "7A70:0000002a".parse().unwrap();
        assert_eq!(uid.manufacturer(), 0x7a70);
        assert_eq!(uid.device(), 42);
        assert!(!uid.is_broadcast());
        assert!(Uid::BROADCAST.is_broadcast());
    }

    #[test]
    fn test_uid_parse_rejects_garbage() {
        for input in ["", "7a70", "7a70:", ":1", "12345:1", "7a70:123456789", "zz:1"] {
            assert_eq!(
                input.parse::<Uid>(),
                Err(ProtocolError::InvalidUid(input.to_string())),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_uid_serde_as_string() {
        let uid = Uid::new(0x00a1, 0x0102_0304);
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, "\"00a1:01020304\"");
        let back: Uid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uid);
    }
}
