use serde::{Deserialize, Serialize};

/// Lifecycle state of the page's streaming connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    #[default]
    Closed,
    Open,
}

impl StreamState {
    pub fn is_open(self) -> bool {
        matches!(self, StreamState::Open)
    }
}
