use serde_json::Value as JsonValue;

use super::topic::Topic;

/// Change notification decoded from one streamed event.
///
/// Only `origin_id` drives behaviour; `method`, `route` and `path` are
/// what the server reports about the write and are kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Topic whose listener received the event
    pub topic: Topic,
    /// Origin id of the tab that caused the change, if the server knew it
    pub origin_id: Option<String>,
    /// HTTP method of the write
    pub method: Option<String>,
    /// Route pattern of the write
    pub route: Option<String>,
    /// Request path of the write
    pub path: Option<String>,
}

impl ChangeEvent {
    /// Decode a raw event payload.
    ///
    /// Empty data counts as `{}`. Anything that is not a JSON object is
    /// treated as carrying no origin information rather than as an error,
    /// so a malformed payload still refreshes the page.
    pub fn decode(topic: Topic, raw: &str) -> Self {
        let raw = if raw.trim().is_empty() { "{}" } else { raw };
        let payload = match serde_json::from_str::<JsonValue>(raw) {
            Ok(JsonValue::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                log::debug!("live-link: undecodable payload for topic {}: {}", topic, e);
                None
            },
        };

        let field = |name: &str| {
            payload
                .as_ref()
                .and_then(|map| map.get(name))
                .and_then(JsonValue::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            origin_id: field("origin_id"),
            method: field("method"),
            route: field("route"),
            path: field("path"),
            topic,
        }
    }
}
