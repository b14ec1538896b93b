use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, VisibilityState, Window};

use url::Url;

use crate::error::{LiveLinkError, Result};
use crate::host::{PageDocument, RefreshTarget};
use crate::models::{Topic, Visibility};

use super::helpers::{describe, function_property};

/// The live `document`, read through the configured attribute names
pub struct BrowserDocument {
    window: Window,
    document: Document,
    topic_attribute: String,
    url_attribute: String,
}

impl BrowserDocument {
    pub fn new(window: Window, document: Document, topic_attribute: &str, url_attribute: &str) -> Self {
        Self {
            window,
            document,
            topic_attribute: topic_attribute.to_string(),
            url_attribute: url_attribute.to_string(),
        }
    }

    /// Every element carrying the topic attribute
    fn subscribed_elements(&self) -> Vec<Element> {
        let selector = format!("[{}]", self.topic_attribute);
        let nodes = match self.document.query_selector_all(&selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("live-link: cannot query {}: {}", selector, describe(&e));
                return Vec::new();
            },
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn htmx(&self) -> Option<JsValue> {
        js_sys::Reflect::get(&self.window, &JsValue::from_str("htmx"))
            .ok()
            .filter(|htmx| !htmx.is_undefined() && !htmx.is_null())
    }
}

impl PageDocument for BrowserDocument {
    fn declared_topics(&self) -> Vec<String> {
        self.subscribed_elements()
            .iter()
            .filter_map(|element| element.get_attribute(&self.topic_attribute))
            .collect()
    }

    fn targets_for(&self, topic: &Topic) -> Vec<Box<dyn RefreshTarget>> {
        let htmx = self.htmx();
        self.subscribed_elements()
            .into_iter()
            .filter(|element| {
                element
                    .get_attribute(&self.topic_attribute)
                    .and_then(|raw| Topic::parse(&raw))
                    .as_ref()
                    == Some(topic)
            })
            .map(|element| {
                Box::new(ElementTarget {
                    element,
                    url_attribute: self.url_attribute.clone(),
                    htmx: htmx.clone(),
                }) as Box<dyn RefreshTarget>
            })
            .collect()
    }

    fn current_url(&self) -> Option<Url> {
        let href = self.window.location().href().ok()?;
        Url::parse(&href).ok()
    }

    fn visibility(&self) -> Visibility {
        match self.document.visibility_state() {
            VisibilityState::Hidden => Visibility::Hidden,
            _ => Visibility::Visible,
        }
    }

    fn supports_fragment_swap(&self) -> bool {
        self.htmx()
            .map(|htmx| function_property(&htmx, "ajax").is_some())
            .unwrap_or(false)
    }

    fn reload(&self) {
        if let Err(e) = self.window.location().reload() {
            log::warn!("live-link: page reload failed: {}", describe(&e));
        }
    }
}

/// Subscribed element refreshed through `htmx.ajax`
pub struct ElementTarget {
    element: Element,
    url_attribute: String,
    htmx: Option<JsValue>,
}

impl RefreshTarget for ElementTarget {
    fn declared_url(&self) -> Option<String> {
        self.element.get_attribute(&self.url_attribute)
    }

    fn swap_from(&self, url: &str) -> Result<()> {
        let refresh_error = |reason: String| LiveLinkError::Refresh {
            url: url.to_string(),
            reason,
        };
        let htmx = self
            .htmx
            .as_ref()
            .ok_or_else(|| refresh_error("htmx is not loaded".to_string()))?;
        let ajax = function_property(htmx, "ajax")
            .ok_or_else(|| refresh_error("htmx.ajax is not a function".to_string()))?;

        let context = js_sys::Object::new();
        js_sys::Reflect::set(&context, &JsValue::from_str("target"), &self.element)
            .map_err(|e| refresh_error(describe(&e)))?;
        js_sys::Reflect::set(&context, &JsValue::from_str("swap"), &JsValue::from_str("outerHTML"))
            .map_err(|e| refresh_error(describe(&e)))?;

        let pending = ajax
            .call3(htmx, &JsValue::from_str("GET"), &JsValue::from_str(url), &context)
            .map_err(|e| refresh_error(describe(&e)))?;

        // htmx resolves the promise after the swap; rejections only get logged.
        if let Ok(promise) = pending.dyn_into::<js_sys::Promise>() {
            let url = url.to_string();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                    log::warn!("live-link: refresh of {} failed: {}", url, describe(&e));
                }
            });
        }
        Ok(())
    }
}
