use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a power transition, as reported to the orchestration layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    /// The VM was confirmed running.
    Active,
    /// The VM was confirmed stopped.
    Deleted,
    /// The transition failed or could not be confirmed.
    Error,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerState::Active => "active",
            PowerState::Deleted => "deleted",
            PowerState::Error => "error",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
