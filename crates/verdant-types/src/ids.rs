//! Type-safe identifier wrappers.
//!
//! Plant identifiers are assigned by the store (`AUTOINCREMENT`), so they
//! are plain integers on the wire and in the database. The newtype keeps
//! them from being mixed up with counters or timestamps.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for a plant. Assigned once at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct PlantId(pub i64);

impl PlantId {
    /// Return the inner integer value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PlantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PlantId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<PlantId> for i64 {
    fn from(id: PlantId) -> Self {
        id.0
    }
}
