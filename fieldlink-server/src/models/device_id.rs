use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

static DEVICE_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{3,20}$").expect("device id pattern is valid"));

/// Identifier a field device uses as its topic segment and login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Placeholder for topics that carry no device segment. Never accepted.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn parse(raw: &str) -> Option<Self> {
        if raw == Self::UNKNOWN || !DEVICE_ID_PATTERN.is_match(raw) {
            return None;
        }

        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for DeviceId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pattern() {
        for raw in ["dev", "dev-abc123", "test_device_001", "A1_b2-C3", "abcdefghijklmnopqrst"] {
            assert!(DeviceId::parse(raw).is_some(), "{raw} should be accepted");
        }
    }

    #[test]
    fn test_rejects_outside_pattern() {
        for raw in ["", "ab", "!!", "dev x", "dev/abc", "abcdefghijklmnopqrstu", "设备001", "dev.1"] {
            assert!(DeviceId::parse(raw).is_none(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_rejects_unknown_placeholder() {
        assert!(DeviceId::parse(DeviceId::UNKNOWN).is_none());
    }
}
