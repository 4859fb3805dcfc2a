//! Identifier types for the call-centre simulator
//!
//! Calls are numbered sequentially in arrival order within each simulated day
//! and replication, and are exported as `customer<N>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix used when a call identifier is rendered or serialized
pub const CALL_ID_PREFIX: &str = "customer";

/// Identifier of a call within one day log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallId(pub u64);

impl CallId {
    /// Create a call identifier from its arrival sequence number
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Arrival sequence number of the call
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CALL_ID_PREFIX, self.0)
    }
}

impl Serialize for CallId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CallId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix(CALL_ID_PREFIX).unwrap_or(&s);
        let sequence = digits.parse::<u64>().map_err(serde::de::Error::custom)?;
        Ok(CallId(sequence))
    }
}
