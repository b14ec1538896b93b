// WASM bindings for live-link
// Installs the page-lifetime engine in the browser and exposes a small
// JavaScript API to start, stop and inspect it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, Element, Event, HtmlFormElement, MouseEvent, PageTransitionEvent};

use crate::error::LiveLinkError;
use crate::host::SessionStore;
use crate::live::{LiveHost, LiveLink};
use crate::models::{LinkClick, LiveOptions, PageSignal};

mod console;
mod event_source;
mod forms;
mod helpers;
mod listeners;
mod page;
mod storage;

pub use event_source::{BrowserConnection, BrowserTransport};
pub use forms::{BrowserForm, HtmxHeaders};
pub use page::{BrowserDocument, ElementTarget};
pub use storage::BrowserSessionStore;

use helpers::{document, window};
use listeners::EventListener;

impl From<LiveLinkError> for JsValue {
    fn from(err: LiveLinkError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Engine plus the DOM listeners feeding it
struct Installed {
    link: Rc<LiveLink>,
    listeners: Vec<EventListener>,
}

thread_local! {
    static ACTIVE: RefCell<Option<Installed>> = RefCell::new(None);
}

/// Start live updates for the current page
///
/// # Arguments
/// * `options` - Optional JSON string with [`LiveOptions`] fields, e.g.
///   `{"events_path": "/events", "log_level": "debug"}`
///
/// Calling it again replaces the running instance; its stream is closed
/// first so the page never holds two connections.
///
/// # Example (JavaScript)
/// ```js
/// import init, { startLiveLink } from './pkg/live_link.js';
///
/// await init();
/// startLiveLink(JSON.stringify({ log_level: "info" }));
/// ```
#[wasm_bindgen(js_name = startLiveLink)]
pub fn start_live_link(options: Option<String>) -> Result<(), JsValue> {
    let options = LiveOptions::from_json(options.as_deref())?;
    console::init(options.level_filter());

    if let Some(previous) = ACTIVE.with(|active| active.borrow_mut().take()) {
        log::debug!("live-link: replacing running instance");
        uninstall(previous);
    }

    let window = window()?;
    let document = document()?;
    let page = Rc::new(BrowserDocument::new(
        window.clone(),
        document.clone(),
        &options.topic_attribute,
        &options.url_attribute,
    ));
    let store = BrowserSessionStore::open().map(|store| Rc::new(store) as Rc<dyn SessionStore>);
    if store.is_none() {
        log::warn!("live-link: session storage unavailable, origin id will not persist");
    }

    let link = Rc::new(LiveLink::init(
        LiveHost {
            document: page,
            transport: Rc::new(BrowserTransport),
            store,
        },
        options,
    ));
    let listeners = install_listeners(&link, &window, &document)?;

    ACTIVE.with(|active| *active.borrow_mut() = Some(Installed { link, listeners }));
    Ok(())
}

/// Stop live updates: remove every listener and close the stream
#[wasm_bindgen(js_name = stopLiveLink)]
pub fn stop_live_link() {
    if let Some(installed) = ACTIVE.with(|active| active.borrow_mut().take()) {
        uninstall(installed);
    }
}

/// Origin id of this tab, once started
#[wasm_bindgen(js_name = liveLinkOriginId)]
pub fn live_link_origin_id() -> Option<String> {
    ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .map(|installed| installed.link.origin_id().to_string())
    })
}

/// Whether the event stream is currently open
#[wasm_bindgen(js_name = liveLinkIsOpen)]
pub fn live_link_is_open() -> bool {
    ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .map_or(false, |installed| installed.link.state().is_open())
    })
}

fn uninstall(installed: Installed) {
    let Installed { link, listeners } = installed;
    drop(listeners);
    match Rc::try_unwrap(link) {
        Ok(link) => link.teardown(),
        Err(shared) => {
            shared.stream().close();
        },
    }
}

fn install_listeners(
    link: &Rc<LiveLink>,
    window: &web_sys::Window,
    document: &web_sys::Document,
) -> Result<Vec<EventListener>, JsValue> {
    let mut listeners = Vec::new();

    let submit_link = Rc::clone(link);
    let submit_document = document.clone();
    listeners.push(EventListener::new(document, "submit", move |event: Event| {
        let Some(form) = event
            .target()
            .and_then(|target| target.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };
        let outcome = submit_link.on_submit(&BrowserForm::new(form, submit_document.clone()));
        log::trace!("live-link: submit tagged {:?}", outcome);
    })?);

    let config_link = Rc::clone(link);
    listeners.push(EventListener::new(document, "htmx:configRequest", move |event: Event| {
        let Some(detail) = event.dyn_ref::<CustomEvent>().map(CustomEvent::detail) else {
            return;
        };
        if let Some((verb, mut headers)) = HtmxHeaders::from_detail(&detail) {
            config_link.on_configure_request(&verb, &mut headers);
        }
    })?);

    let click_link = Rc::clone(link);
    listeners.push(EventListener::new(document, "click", move |event: Event| {
        let Some(click) = link_click(&event) else {
            return;
        };
        click_link.handle_signal(&PageSignal::LinkClick(click));
    })?);

    let visibility_link = Rc::clone(link);
    listeners.push(EventListener::new(document, "visibilitychange", move |_: Event| {
        visibility_link.on_visibility_change();
    })?);

    let pagehide_link = Rc::clone(link);
    listeners.push(EventListener::new(window, "pagehide", move |_: Event| {
        pagehide_link.handle_signal(&PageSignal::PageHide);
    })?);

    let unload_link = Rc::clone(link);
    listeners.push(EventListener::new(window, "beforeunload", move |_: Event| {
        unload_link.handle_signal(&PageSignal::BeforeUnload);
    })?);

    let pageshow_link = Rc::clone(link);
    listeners.push(EventListener::new(window, "pageshow", move |event: Event| {
        let persisted = event
            .dyn_ref::<PageTransitionEvent>()
            .map_or(false, PageTransitionEvent::persisted);
        pageshow_link.handle_signal(&PageSignal::PageShow { persisted });
    })?);

    Ok(listeners)
}

/// Snapshot the anchor enclosing the click target
fn link_click(event: &Event) -> Option<LinkClick> {
    let anchor = event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest("a")
        .ok()
        .flatten()?;
    let (button, modified) = event
        .dyn_ref::<MouseEvent>()
        .map(|mouse| {
            (
                mouse.button(),
                mouse.ctrl_key() || mouse.meta_key() || mouse.shift_key() || mouse.alt_key(),
            )
        })
        .unwrap_or((0, false));

    Some(LinkClick {
        href: anchor.get_attribute("href"),
        target: anchor.get_attribute("target"),
        download: anchor.has_attribute("download"),
        button,
        modified,
    })
}
