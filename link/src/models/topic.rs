use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a change category a page element subscribes to.
///
/// Always non-empty and trimmed; construct through [`Topic::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Parse a declared attribute value, rejecting blank names
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Streamed event name for this topic: `<prefix>.<topic>.changed`.
    ///
    /// The server builds the same name when it publishes, so both sides
    /// must agree on `prefix`.
    pub fn event_name(&self, prefix: &str) -> String {
        format!("{}.{}.changed", prefix, self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
