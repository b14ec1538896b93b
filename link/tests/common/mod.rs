//! In-memory page host shared by the integration tests.
//!
//! Every fake records what the engine did to it so tests can assert on
//! swaps, reloads, connections and form mutations.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use live_link::{
    EventConnection, EventHandler, EventTransport, LiveHost, LiveLink, LiveLinkError, LiveOptions,
    OutboundForm, PageDocument, RefreshTarget, RequestHeaders, Result, SessionStore, Topic,
    Visibility,
};
use url::Url;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ==================== Document ====================

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub id: usize,
    pub topic: String,
    pub url: Option<String>,
}

pub struct FakeDocument {
    elements: RefCell<Vec<FakeElement>>,
    page_url: RefCell<Url>,
    visibility: Cell<Visibility>,
    fragment_swap: Cell<bool>,
    failing: RefCell<HashSet<usize>>,
    swaps: Rc<RefCell<Vec<(usize, String)>>>,
    reloads: Cell<usize>,
}

impl FakeDocument {
    pub fn new(page_url: &str) -> Rc<Self> {
        Rc::new(Self {
            elements: RefCell::new(Vec::new()),
            page_url: RefCell::new(Url::parse(page_url).expect("valid page url")),
            visibility: Cell::new(Visibility::Visible),
            fragment_swap: Cell::new(true),
            failing: RefCell::new(HashSet::new()),
            swaps: Rc::new(RefCell::new(Vec::new())),
            reloads: Cell::new(0),
        })
    }

    /// Add an element subscribed to `topic`; returns its id
    pub fn add(&self, topic: &str, url: Option<&str>) -> usize {
        let mut elements = self.elements.borrow_mut();
        let id = elements.iter().map(|element| element.id).max().unwrap_or(0) + 1;
        elements.push(FakeElement {
            id,
            topic: topic.to_string(),
            url: url.map(str::to_string),
        });
        id
    }

    pub fn remove(&self, id: usize) {
        self.elements.borrow_mut().retain(|element| element.id != id);
    }

    pub fn clear(&self) {
        self.elements.borrow_mut().clear();
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.visibility.set(visibility);
    }

    pub fn set_fragment_swap(&self, available: bool) {
        self.fragment_swap.set(available);
    }

    pub fn fail_swaps_for(&self, id: usize) {
        self.failing.borrow_mut().insert(id);
    }

    /// `(element id, url)` of every swap issued so far
    pub fn swaps(&self) -> Vec<(usize, String)> {
        self.swaps.borrow().clone()
    }

    pub fn swapped_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.swaps.borrow().iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }
}

impl PageDocument for FakeDocument {
    fn declared_topics(&self) -> Vec<String> {
        self.elements
            .borrow()
            .iter()
            .map(|element| element.topic.clone())
            .collect()
    }

    fn targets_for(&self, topic: &Topic) -> Vec<Box<dyn RefreshTarget>> {
        let failing = self.failing.borrow();
        self.elements
            .borrow()
            .iter()
            .filter(|element| element.topic == topic.as_str())
            .map(|element| {
                Box::new(FakeTarget {
                    id: element.id,
                    url: element.url.clone(),
                    fail: failing.contains(&element.id),
                    swaps: Rc::clone(&self.swaps),
                }) as Box<dyn RefreshTarget>
            })
            .collect()
    }

    fn current_url(&self) -> Option<Url> {
        Some(self.page_url.borrow().clone())
    }

    fn visibility(&self) -> Visibility {
        self.visibility.get()
    }

    fn supports_fragment_swap(&self) -> bool {
        self.fragment_swap.get()
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

pub struct FakeTarget {
    id: usize,
    url: Option<String>,
    fail: bool,
    swaps: Rc<RefCell<Vec<(usize, String)>>>,
}

impl RefreshTarget for FakeTarget {
    fn declared_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn swap_from(&self, url: &str) -> Result<()> {
        if self.fail {
            return Err(LiveLinkError::Refresh {
                url: url.to_string(),
                reason: "503 Service Unavailable".to_string(),
            });
        }
        self.swaps.borrow_mut().push((self.id, url.to_string()));
        Ok(())
    }
}

// ==================== Transport ====================

pub struct ConnectionState {
    pub path: String,
    handlers: RefCell<HashMap<String, EventHandler>>,
    closed: Cell<bool>,
}

impl ConnectionState {
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

pub struct FakeTransport {
    supported: Cell<bool>,
    fail_connect: Cell<bool>,
    fail_subscribe: Cell<bool>,
    connections: RefCell<Vec<Rc<ConnectionState>>>,
}

impl FakeTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            supported: Cell::new(true),
            fail_connect: Cell::new(false),
            fail_subscribe: Cell::new(false),
            connections: RefCell::new(Vec::new()),
        })
    }

    pub fn unsupported() -> Rc<Self> {
        let transport = Self::new();
        transport.supported.set(false);
        transport
    }

    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.set(fail);
    }

    pub fn fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.set(fail);
    }

    pub fn connections(&self) -> Vec<Rc<ConnectionState>> {
        self.connections.borrow().clone()
    }

    /// Connections not closed yet
    pub fn live_connections(&self) -> usize {
        self.connections
            .borrow()
            .iter()
            .filter(|connection| !connection.is_closed())
            .count()
    }

    /// Deliver `data` as event `event_name` on the live connection.
    ///
    /// Returns `false` when no live connection listens for that name.
    pub fn emit(&self, event_name: &str, data: &str) -> bool {
        let handler = self
            .connections
            .borrow()
            .iter()
            .rev()
            .find(|connection| !connection.is_closed())
            .and_then(|connection| connection.handlers.borrow().get(event_name).cloned());
        match handler {
            Some(handler) => {
                handler(data);
                true
            },
            None => false,
        }
    }
}

impl EventTransport for FakeTransport {
    fn is_supported(&self) -> bool {
        self.supported.get()
    }

    fn connect(&self, path: &str) -> Result<Box<dyn EventConnection>> {
        if self.fail_connect.get() {
            return Err(LiveLinkError::Transport("connection refused".to_string()));
        }
        let state = Rc::new(ConnectionState {
            path: path.to_string(),
            handlers: RefCell::new(HashMap::new()),
            closed: Cell::new(false),
        });
        self.connections.borrow_mut().push(Rc::clone(&state));
        Ok(Box::new(FakeConnection {
            state,
            fail_subscribe: self.fail_subscribe.get(),
        }))
    }
}

struct FakeConnection {
    state: Rc<ConnectionState>,
    fail_subscribe: bool,
}

impl EventConnection for FakeConnection {
    fn subscribe(&mut self, event_name: &str, handler: EventHandler) -> Result<()> {
        if self.fail_subscribe {
            return Err(LiveLinkError::Transport(format!("cannot listen to {}", event_name)));
        }
        self.state
            .handlers
            .borrow_mut()
            .insert(event_name.to_string(), handler);
        Ok(())
    }

    fn close(&mut self) {
        self.state.closed.set(true);
        self.state.handlers.borrow_mut().clear();
    }
}

// ==================== Storage ====================

#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_item(key: &str, value: &str) -> Rc<Self> {
        let store = Self::default();
        store.items.borrow_mut().insert(key.to_string(), value.to_string());
        Rc::new(store)
    }

    pub fn item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ==================== Forms ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeField {
    pub name: String,
    pub value: String,
    pub hidden: bool,
}

pub struct FakeForm {
    method: String,
    attributes: HashSet<String>,
    action: RefCell<String>,
    fields: RefCell<Vec<FakeField>>,
}

impl FakeForm {
    pub fn new(method: &str, action: &str) -> Self {
        Self {
            method: method.to_string(),
            attributes: HashSet::new(),
            action: RefCell::new(action.to_string()),
            fields: RefCell::new(Vec::new()),
        }
    }

    pub fn with_attribute(mut self, name: &str) -> Self {
        self.attributes.insert(name.to_string());
        self
    }

    pub fn with_field(self, name: &str, value: &str) -> Self {
        self.fields.borrow_mut().push(FakeField {
            name: name.to_string(),
            value: value.to_string(),
            hidden: false,
        });
        self
    }

    pub fn fields_named(&self, name: &str) -> Vec<FakeField> {
        self.fields
            .borrow()
            .iter()
            .filter(|field| field.name == name)
            .cloned()
            .collect()
    }
}

impl OutboundForm for FakeForm {
    fn method(&self) -> String {
        self.method.clone()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains(name)
    }

    fn action(&self) -> String {
        self.action.borrow().clone()
    }

    fn set_action(&self, url: &str) {
        *self.action.borrow_mut() = url.to_string();
    }

    fn field_value(&self, name: &str) -> Option<String> {
        self.fields
            .borrow()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.clone())
    }

    fn set_field_value(&self, name: &str, value: &str) -> bool {
        match self.fields.borrow_mut().iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.to_string();
                true
            },
            None => false,
        }
    }

    fn append_hidden_field(&self, name: &str, value: &str) -> Result<()> {
        self.fields.borrow_mut().push(FakeField {
            name: name.to_string(),
            value: value.to_string(),
            hidden: true,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeHeaders {
    pub values: HashMap<String, String>,
}

impl RequestHeaders for FakeHeaders {
    fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

// ==================== Wiring ====================

pub const ORIGIN: &str = "tab-origin-1";

/// Engine over the fakes, with the origin id pre-seeded to [`ORIGIN`]
pub fn start(document: &Rc<FakeDocument>, transport: &Rc<FakeTransport>) -> LiveLink {
    init_logging();
    let options = LiveOptions::default();
    let store = MemoryStore::with_item(&options.storage_key, ORIGIN);
    LiveLink::init(
        LiveHost {
            document: Rc::clone(document) as Rc<dyn PageDocument>,
            transport: Rc::clone(transport) as Rc<dyn EventTransport>,
            store: Some(store as Rc<dyn SessionStore>),
        },
        options,
    )
}
