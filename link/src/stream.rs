use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dispatch::RefreshDispatcher;
use crate::error::Result;
use crate::host::{EventConnection, EventHandler, EventTransport, PageDocument};
use crate::models::{LiveOptions, StreamState, Topic};
use crate::topics::TopicRegistry;

/// Owner of the page's single streaming connection.
///
/// `open` and `close` are the only operations that touch the connection
/// handle. A second `open` while a connection is live does nothing, so at
/// most one stream exists per page.
pub struct StreamManager {
    transport: Rc<dyn EventTransport>,
    document: Rc<dyn PageDocument>,
    dispatcher: Rc<RefreshDispatcher>,
    events_path: String,
    event_prefix: String,
    connection: RefCell<Option<Box<dyn EventConnection>>>,
    connections_opened: Cell<u64>,
}

impl StreamManager {
    pub fn new(
        transport: Rc<dyn EventTransport>,
        document: Rc<dyn PageDocument>,
        dispatcher: Rc<RefreshDispatcher>,
        options: &LiveOptions,
    ) -> Self {
        Self {
            transport,
            document,
            dispatcher,
            events_path: options.events_path.clone(),
            event_prefix: options.event_prefix.clone(),
            connection: RefCell::new(None),
            connections_opened: Cell::new(0),
        }
    }

    pub fn state(&self) -> StreamState {
        if self.connection.borrow().is_some() {
            StreamState::Open
        } else {
            StreamState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Number of connections opened over the manager's lifetime
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened.get()
    }

    /// Open the stream if topics are present and none is live.
    ///
    /// Never fails: an unsupported platform, an empty topic set or a
    /// transport error all leave the manager closed.
    pub fn open(&self) -> StreamState {
        if !self.transport.is_supported() {
            log::debug!("live-link: streaming unsupported, live updates disabled");
            return StreamState::Closed;
        }

        let topics = TopicRegistry::collect(self.document.as_ref());
        if topics.is_empty() {
            log::debug!("live-link: no subscribed elements, stream stays closed");
            return self.state();
        }

        if self.is_open() {
            return StreamState::Open;
        }

        match self.connect(topics.iter()) {
            Ok(connection) => {
                *self.connection.borrow_mut() = Some(connection);
                self.connections_opened.set(self.connections_opened.get() + 1);
                log::debug!(
                    "live-link: stream opened on {} for {} topic(s)",
                    self.events_path,
                    topics.len()
                );
                StreamState::Open
            },
            Err(e) => {
                log::warn!("live-link: cannot open stream: {}", e);
                StreamState::Closed
            },
        }
    }

    fn connect<'a>(
        &self,
        topics: impl Iterator<Item = &'a Topic>,
    ) -> Result<Box<dyn EventConnection>> {
        let mut connection = self.transport.connect(&self.events_path)?;
        for topic in topics {
            let event_name = topic.event_name(&self.event_prefix);
            if let Err(e) = connection.subscribe(&event_name, self.handler_for(topic)) {
                connection.close();
                return Err(e);
            }
        }
        Ok(connection)
    }

    fn handler_for(&self, topic: &Topic) -> EventHandler {
        let dispatcher = Rc::clone(&self.dispatcher);
        let topic = topic.clone();
        Rc::new(move |data: &str| {
            dispatcher.on_event(&topic, data);
        })
    }

    /// Close the live stream. Returns `false` when nothing was open.
    pub fn close(&self) -> bool {
        let taken = self.connection.borrow_mut().take();
        match taken {
            Some(mut connection) => {
                connection.close();
                log::debug!("live-link: stream closed");
                true
            },
            None => false,
        }
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        self.close();
    }
}
