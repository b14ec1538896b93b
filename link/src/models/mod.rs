//! Data models for live-link.
//!
//! Defines the identifiers, decoded events, signals and options shared by
//! the engine components and the browser bindings.

pub mod change_event;
pub mod live_options;
pub mod origin_id;
pub mod page_signal;
pub mod stream_state;
pub mod topic;


pub use change_event::ChangeEvent;
pub use live_options::LiveOptions;
pub use origin_id::OriginId;
pub use page_signal::{LinkClick, PageSignal, Visibility};
pub use stream_state::StreamState;
pub use topic::Topic;
