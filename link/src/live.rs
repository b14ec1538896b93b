use std::rc::Rc;

use crate::dispatch::RefreshDispatcher;
use crate::host::{EventTransport, OutboundForm, PageDocument, RequestHeaders, SessionStore};
use crate::lifecycle::LifecycleController;
use crate::models::{LiveOptions, OriginId, PageSignal, StreamState};
use crate::origin::OriginIdentity;
use crate::stream::StreamManager;
use crate::tagger::{OutboundTagger, TagOutcome};

/// Host services a [`LiveLink`] runs on
pub struct LiveHost {
    pub document: Rc<dyn PageDocument>,
    pub transport: Rc<dyn EventTransport>,
    pub store: Option<Rc<dyn SessionStore>>,
}

/// Page-lifetime live-update instance.
///
/// Owns the origin id, the outbound tagger and the single stream manager.
/// [`LiveLink::init`] opens the stream when the page has subscribed
/// elements; [`LiveLink::teardown`] (or dropping the instance) closes it.
pub struct LiveLink {
    options: LiveOptions,
    origin_id: OriginId,
    tagger: OutboundTagger,
    stream: Rc<StreamManager>,
    lifecycle: LifecycleController,
    document: Rc<dyn PageDocument>,
}

impl LiveLink {
    /// Build the instance and open the stream if the page needs one
    pub fn init(host: LiveHost, options: LiveOptions) -> Self {
        let origin_id = OriginIdentity::new(host.store, options.storage_key.clone()).get_or_create();
        let tagger = OutboundTagger::new(origin_id.clone(), &options);
        let dispatcher = Rc::new(RefreshDispatcher::new(origin_id.clone(), Rc::clone(&host.document)));
        let stream = Rc::new(StreamManager::new(
            host.transport,
            Rc::clone(&host.document),
            dispatcher,
            &options,
        ));
        let lifecycle = LifecycleController::new(Rc::clone(&stream), Rc::clone(&host.document));

        let link = Self {
            options,
            origin_id,
            tagger,
            stream,
            lifecycle,
            document: host.document,
        };
        let state = link.stream.open();
        log::debug!("live-link: initialised, stream {:?}", state);
        link
    }

    pub fn options(&self) -> &LiveOptions {
        &self.options
    }

    pub fn origin_id(&self) -> &OriginId {
        &self.origin_id
    }

    pub fn stream(&self) -> &StreamManager {
        &self.stream
    }

    pub fn state(&self) -> StreamState {
        self.stream.state()
    }

    /// Forward a lifecycle signal
    pub fn handle_signal(&self, signal: &PageSignal) -> StreamState {
        self.lifecycle.handle(signal)
    }

    /// `visibilitychange` handler
    pub fn on_visibility_change(&self) -> StreamState {
        self.lifecycle.on_visibility_change()
    }

    /// Document-level `submit` handler. Tagging failures are logged only.
    pub fn on_submit(&self, form: &dyn OutboundForm) -> TagOutcome {
        let base = self.document.current_url();
        match self.tagger.on_submit(form, base.as_ref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("live-link: could not tag form submission: {}", e);
                TagOutcome::Skipped
            },
        }
    }

    /// Framework request-configuration handler
    pub fn on_configure_request(&self, verb: &str, headers: &mut dyn RequestHeaders) -> bool {
        self.tagger
            .configure_request(verb, headers)
            .unwrap_or_else(|e| {
                log::warn!("live-link: could not tag request: {}", e);
                false
            })
    }

    /// Close the stream and release the instance
    pub fn teardown(self) {
        self.stream.close();
        log::debug!("live-link: torn down");
    }
}
