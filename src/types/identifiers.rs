//! Newtype wrappers for type safety
//!
//! Recording ids are assigned by the profiling engine and never reused, so
//! they are wrapped instead of passed around as bare integers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Recording ID newtype for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(u64);

impl RecordingId {
    /// Create a new recording ID
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordingId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
