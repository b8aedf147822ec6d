//! Correlation types for verification runs
//!
//! A run is one pass of schema preparation followed by every registered
//! round-trip verification. Log events and errors raised during the run
//! carry its `RunId` so a report can be tied back to its log lines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single verification run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new random RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through a verification run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    /// Name of the persistence unit the run targets
    pub unit: String,
}

impl RunContext {
    /// Create a new context with a fresh RunId
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            run_id: RunId::new(),
            unit: unit.into(),
        }
    }

    /// Create a context with an existing RunId
    pub fn with_run_id(run_id: RunId, unit: impl Into<String>) -> Self {
        Self {
            run_id,
            unit: unit.into(),
        }
    }
}
