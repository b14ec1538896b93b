use serde::{Deserialize, Serialize};

use crate::error::{LiveLinkError, Result};

/// Page-level options for the live-update engine.
///
/// Every name the engine shares with the server or the page markup lives
/// here: the streaming endpoint, the event naming prefix, the DOM
/// attributes, and the names used to tag outbound requests.
///
/// # Example
///
/// ```rust
/// use live_link::LiveOptions;
///
/// let options = LiveOptions::default()
///     .with_events_path("/stream")
///     .with_event_prefix("shop")
///     .with_log_level("debug");
/// assert_eq!(options.events_path, "/stream");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveOptions {
    /// Path of the Server-Sent Events endpoint
    /// Default: `/events`
    #[serde(default = "default_events_path")]
    pub events_path: String,

    /// Prefix of streamed event names (`<prefix>.<topic>.changed`)
    /// Default: `app`
    #[serde(default = "default_event_prefix")]
    pub event_prefix: String,

    /// Attribute declaring the topic an element subscribes to
    /// Default: `data-sse-topic`
    #[serde(default = "default_topic_attribute")]
    pub topic_attribute: String,

    /// Attribute declaring the element's fragment refresh URL
    /// Default: `data-sse-url`
    #[serde(default = "default_url_attribute")]
    pub url_attribute: String,

    /// Session storage key holding the tab's origin id
    /// Default: `jaiu-origin-id`
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Header carrying the origin id on framework requests
    /// Default: `X-Origin-ID`
    #[serde(default = "default_origin_header")]
    pub origin_header: String,

    /// Query parameter and hidden field name carrying the origin id
    /// Default: `origin_id`
    #[serde(default = "default_origin_field")]
    pub origin_field: String,

    /// Attributes marking a form as handled by the AJAX framework
    #[serde(default = "default_framework_attributes")]
    pub framework_attributes: Vec<String>,

    /// Maximum level forwarded to the browser console
    /// Default: `warn`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_events_path() -> String {
    "/events".to_string()
}

fn default_event_prefix() -> String {
    "app".to_string()
}

fn default_topic_attribute() -> String {
    "data-sse-topic".to_string()
}

fn default_url_attribute() -> String {
    "data-sse-url".to_string()
}

fn default_storage_key() -> String {
    "jaiu-origin-id".to_string()
}

fn default_origin_header() -> String {
    "X-Origin-ID".to_string()
}

fn default_origin_field() -> String {
    "origin_id".to_string()
}

fn default_framework_attributes() -> Vec<String> {
    ["hx-post", "hx-put", "hx-patch", "hx-delete"]
        .iter()
        .map(|attr| attr.to_string())
        .collect()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            event_prefix: default_event_prefix(),
            topic_attribute: default_topic_attribute(),
            url_attribute: default_url_attribute(),
            storage_key: default_storage_key(),
            origin_header: default_origin_header(),
            origin_field: default_origin_field(),
            framework_attributes: default_framework_attributes(),
            log_level: default_log_level(),
        }
    }
}

impl LiveOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from an optional JSON string.
    ///
    /// `None` or a blank string yields the defaults. Missing fields fall back
    /// to their defaults individually. The result is validated.
    pub fn from_json(json: Option<&str>) -> Result<Self> {
        let options = match json.map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => serde_json::from_str(raw)?,
        };
        options.validate()?;
        Ok(options)
    }

    /// Reject options the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.events_path.starts_with('/') {
            return Err(LiveLinkError::Config(format!(
                "events_path must start with '/', got '{}'",
                self.events_path
            )));
        }
        let required = [
            ("event_prefix", &self.event_prefix),
            ("topic_attribute", &self.topic_attribute),
            ("url_attribute", &self.url_attribute),
            ("storage_key", &self.storage_key),
            ("origin_header", &self.origin_header),
            ("origin_field", &self.origin_field),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(LiveLinkError::Config(format!("{} cannot be empty", name)));
            }
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(LiveLinkError::Config(format!(
                "unknown log_level '{}'",
                self.log_level
            )));
        }
        Ok(())
    }

    /// Log level as a `log` filter; unknown values fall back to `warn`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }

    /// Set the Server-Sent Events endpoint path
    pub fn with_events_path(mut self, path: impl Into<String>) -> Self {
        self.events_path = path.into();
        self
    }

    /// Set the event name prefix
    pub fn with_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Set the topic and refresh URL attribute names
    pub fn with_attributes(
        mut self,
        topic_attribute: impl Into<String>,
        url_attribute: impl Into<String>,
    ) -> Self {
        self.topic_attribute = topic_attribute.into();
        self.url_attribute = url_attribute.into();
        self
    }

    /// Set the session storage key for the origin id
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the console log level (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
