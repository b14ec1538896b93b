use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-tab token attached to outgoing mutations.
///
/// The server echoes it back in the change event payload so the tab can
/// recognise notifications caused by its own writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `other` names this origin. Blank ids never match.
    pub fn matches(&self, other: &str) -> bool {
        !other.is_empty() && self.0 == other
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
