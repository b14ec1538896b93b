//! Host seams between the engine and the page it runs in.
//!
//! The engine only talks to the browser through these traits. The `wasm`
//! feature implements them on top of `web-sys`; tests implement them with
//! in-memory fakes.

use std::rc::Rc;

use url::Url;

use crate::error::Result;
use crate::models::{Topic, Visibility};

/// Tab-scoped key/value storage (`window.sessionStorage`)
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// One element subscribed to a topic.
///
/// Handles are produced fresh by [`PageDocument::targets_for`] on every
/// dispatch and dropped afterwards.
pub trait RefreshTarget {
    /// Declared fragment URL (`data-sse-url`), unresolved
    fn declared_url(&self) -> Option<String>;

    /// GET `url` and replace this element's whole markup with the response.
    ///
    /// Completion may be asynchronous; an `Ok` only means the request was
    /// issued.
    fn swap_from(&self, url: &str) -> Result<()>;
}

/// Read access to the live page
pub trait PageDocument {
    /// Values of every topic attribute currently in the DOM, duplicates included
    fn declared_topics(&self) -> Vec<String>;

    /// Elements currently subscribed to `topic`
    fn targets_for(&self, topic: &Topic) -> Vec<Box<dyn RefreshTarget>>;

    /// Current page URL, `None` when it cannot be read or parsed
    fn current_url(&self) -> Option<Url>;

    fn visibility(&self) -> Visibility;

    /// Whether the AJAX framework is loaded and can swap fragments
    fn supports_fragment_swap(&self) -> bool;

    /// Reload the whole page
    fn reload(&self);
}

/// Form being submitted at the document level
pub trait OutboundForm {
    /// Submission method as declared, any case; empty means GET
    fn method(&self) -> String;

    fn has_attribute(&self, name: &str) -> bool;

    /// Resolved action URL
    fn action(&self) -> String;

    fn set_action(&self, url: &str);

    /// Current value of the first input named `name`
    fn field_value(&self, name: &str) -> Option<String>;

    /// Update the first input named `name`; returns `false` when there is none
    fn set_field_value(&self, name: &str, value: &str) -> bool;

    fn append_hidden_field(&self, name: &str, value: &str) -> Result<()>;
}

/// Header bag of a framework request being configured
pub trait RequestHeaders {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()>;
}

/// Handler for the raw `data` of one named event
pub type EventHandler = Rc<dyn Fn(&str)>;

/// Streaming transport (`EventSource`)
pub trait EventTransport {
    /// Whether the platform can open streams at all
    fn is_supported(&self) -> bool;

    fn connect(&self, path: &str) -> Result<Box<dyn EventConnection>>;
}

/// One open stream
pub trait EventConnection {
    /// Attach `handler` to events named `event_name`
    fn subscribe(&mut self, event_name: &str, handler: EventHandler) -> Result<()>;

    /// Close the stream. Must be safe to call more than once.
    fn close(&mut self);
}
