//! Timestamp value object (Unix milliseconds, UTC).

use serde::{Deserialize, Serialize};

/// Unix timestamp in milliseconds (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Get the raw Unix millisecond value
    pub fn value(&self) -> i64 {
        self.0
    }
}
