//! # live-link: live fragment refresh for server-rendered pages
//!
//! A WebAssembly-compatible engine that keeps server-rendered page fragments
//! fresh. The page subscribes to Server-Sent Events, and each change event
//! re-fetches only the elements subscribed to the changed topic.
//!
//! ## Features
//!
//! - **Topic subscriptions**: elements declare `data-sse-topic`; one stream
//!   carries an `app.<topic>.changed` event per topic
//! - **Echo suppression**: outgoing writes carry a per-tab origin id and the
//!   tab ignores notifications of its own writes
//! - **Fragment refresh**: targets are swapped from their `data-sse-url`,
//!   with a full page reload when the AJAX framework is missing
//! - **Lifecycle aware**: the stream closes when the tab is hidden or left
//!   and reopens when it comes back
//! - **WASM bindings**: the `wasm` feature binds everything to the browser
//!
//! ## Quick Start (JavaScript)
//!
//! ```js
//! import init, { startLiveLink } from './pkg/live_link.js';
//!
//! await init();
//! startLiveLink(JSON.stringify({ events_path: "/events" }));
//! ```
//!
//! ## Embedding
//!
//! The engine runs on any host implementing the traits in [`host`]:
//!
//! ```rust,ignore
//! use live_link::{LiveHost, LiveLink, LiveOptions, PageSignal, Visibility};
//!
//! let link = LiveLink::init(
//!     LiveHost { document, transport, store: Some(store) },
//!     LiveOptions::default(),
//! );
//! link.handle_signal(&PageSignal::VisibilityChanged(Visibility::Hidden));
//! link.teardown();
//! ```

pub mod dispatch;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod live;
pub mod models;
pub mod origin;
pub mod stream;
pub mod tagger;
pub mod topics;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export main types for convenience
pub use dispatch::{build_refresh_url, DispatchOutcome, RefreshDispatcher, RefreshStrategy};
pub use error::{LiveLinkError, Result};
pub use host::{
    EventConnection, EventHandler, EventTransport, OutboundForm, PageDocument, RefreshTarget,
    RequestHeaders, SessionStore,
};
pub use lifecycle::{should_close_for_link, LifecycleController};
pub use live::{LiveHost, LiveLink};
pub use models::{
    ChangeEvent, LinkClick, LiveOptions, OriginId, PageSignal, StreamState, Topic, Visibility,
};
pub use origin::{generate_origin_id, OriginIdentity};
pub use stream::StreamManager;
pub use tagger::{with_origin_query, OutboundTagger, TagOutcome};
pub use topics::TopicRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
