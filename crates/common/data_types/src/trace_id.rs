use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlates the RPC and object-store calls of one adaptor operation in
/// logs across services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(pub u64);

impl TraceId {
    pub fn new() -> Self {
        Self(rand::random())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u64> for TraceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TraceId> for u64 {
    fn from(value: TraceId) -> Self {
        value.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
