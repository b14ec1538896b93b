use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlFormElement, HtmlInputElement};

use crate::error::{LiveLinkError, Result};
use crate::host::{OutboundForm, RequestHeaders};

use super::helpers::{describe, dom_error};

/// Form element caught by the document-level `submit` listener
pub struct BrowserForm {
    form: HtmlFormElement,
    document: Document,
}

impl BrowserForm {
    pub fn new(form: HtmlFormElement, document: Document) -> Self {
        Self { form, document }
    }

    fn input_named(&self, name: &str) -> Option<HtmlInputElement> {
        let selector = format!("input[name=\"{}\"]", name.replace('\\', "\\\\").replace('"', "\\\""));
        self.form
            .query_selector(&selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    }
}

impl OutboundForm for BrowserForm {
    fn method(&self) -> String {
        self.form.method()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.form.has_attribute(name)
    }

    fn action(&self) -> String {
        self.form.action()
    }

    fn set_action(&self, url: &str) {
        self.form.set_action(url);
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.input_named(name).map(|input| input.value())
    }

    fn set_field_value(&self, name: &str, value: &str) -> bool {
        match self.input_named(name) {
            Some(input) => {
                input.set_value(value);
                true
            },
            None => false,
        }
    }

    fn append_hidden_field(&self, name: &str, value: &str) -> Result<()> {
        let input = self
            .document
            .create_element("input")
            .map_err(|e| dom_error("create input", e))?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| LiveLinkError::Dom("created element is not an input".to_string()))?;
        input.set_type("hidden");
        input.set_name(name);
        input.set_value(value);
        self.form
            .append_child(&input)
            .map_err(|e| dom_error("append hidden input", e))?;
        Ok(())
    }
}

/// `event.detail.headers` of an `htmx:configRequest` event
pub struct HtmxHeaders {
    headers: JsValue,
}

impl HtmxHeaders {
    /// Extract the verb and header bag from the event detail.
    ///
    /// `None` when the detail carries no header object.
    pub fn from_detail(detail: &JsValue) -> Option<(String, Self)> {
        let headers = js_sys::Reflect::get(detail, &JsValue::from_str("headers")).ok()?;
        if !headers.is_object() {
            return None;
        }
        let verb = js_sys::Reflect::get(detail, &JsValue::from_str("verb"))
            .ok()
            .and_then(|verb| verb.as_string())
            .unwrap_or_default();
        Some((verb, Self { headers }))
    }
}

impl RequestHeaders for HtmxHeaders {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        js_sys::Reflect::set(&self.headers, &JsValue::from_str(name), &JsValue::from_str(value))
            .map_err(|e| LiveLinkError::Dom(format!("set header {}: {}", name, describe(&e))))?;
        Ok(())
    }
}
