use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventSource, MessageEvent};

use crate::error::{LiveLinkError, Result};
use crate::host::{EventConnection, EventHandler, EventTransport};

use super::helpers::{describe, window};
use super::listeners::EventListener;

/// Streams over the browser's native `EventSource`
pub struct BrowserTransport;

impl EventTransport for BrowserTransport {
    fn is_supported(&self) -> bool {
        window()
            .ok()
            .and_then(|window| js_sys::Reflect::has(&window, &JsValue::from_str("EventSource")).ok())
            .unwrap_or(false)
    }

    fn connect(&self, path: &str) -> Result<Box<dyn EventConnection>> {
        let source = EventSource::new(path)
            .map_err(|e| LiveLinkError::Transport(format!("EventSource({}): {}", path, describe(&e))))?;
        Ok(Box::new(BrowserConnection {
            source,
            listeners: Vec::new(),
        }))
    }
}

/// One `EventSource` plus the listeners attached to it
pub struct BrowserConnection {
    source: EventSource,
    listeners: Vec<EventListener>,
}

impl EventConnection for BrowserConnection {
    fn subscribe(&mut self, event_name: &str, handler: EventHandler) -> Result<()> {
        let listener = EventListener::new(&self.source, event_name, move |event: Event| {
            let data = event
                .dyn_ref::<MessageEvent>()
                .and_then(|message| message.data().as_string())
                .unwrap_or_default();
            handler(&data);
        })
        .map_err(|e| LiveLinkError::Transport(format!("listen {}: {}", event_name, describe(&e))))?;
        self.listeners.push(listener);
        Ok(())
    }

    fn close(&mut self) {
        self.source.close();
        self.listeners.clear();
    }
}

impl Drop for BrowserConnection {
    fn drop(&mut self) {
        self.source.close();
    }
}
