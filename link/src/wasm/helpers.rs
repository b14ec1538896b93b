use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Window};

use crate::error::LiveLinkError;

/// Render a JavaScript exception for logging
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

pub(crate) fn dom_error(context: &str, value: JsValue) -> LiveLinkError {
    LiveLinkError::Dom(format!("{}: {}", context, describe(&value)))
}

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("live-link: no window object available"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("live-link: no document available"))
}

/// Read `object[name]` as a function, if it is one
pub(crate) fn function_property(object: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_sys::Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .filter(|value| value.is_function())
        .map(|value| value.unchecked_into::<js_sys::Function>())
}
