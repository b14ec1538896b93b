use std::rc::Rc;

use url::Url;

use crate::host::PageDocument;
use crate::models::{LinkClick, PageSignal, StreamState, Visibility};
use crate::stream::StreamManager;
use crate::tagger::resolve;

/// Drives the stream's open/close transitions from browser lifecycle
/// signals.
pub struct LifecycleController {
    stream: Rc<StreamManager>,
    document: Rc<dyn PageDocument>,
}

impl LifecycleController {
    pub fn new(stream: Rc<StreamManager>, document: Rc<dyn PageDocument>) -> Self {
        Self { stream, document }
    }

    /// React to one signal and report the resulting stream state
    pub fn handle(&self, signal: &PageSignal) -> StreamState {
        match signal {
            PageSignal::VisibilityChanged(Visibility::Hidden) => {
                self.stream.close();
            },
            PageSignal::VisibilityChanged(Visibility::Visible) => {
                self.stream.open();
            },
            PageSignal::PageShow { persisted } => {
                if !self.stream.is_open() {
                    log::debug!("live-link: pageshow (persisted: {}), reopening", persisted);
                    self.stream.open();
                }
            },
            PageSignal::PageHide | PageSignal::BeforeUnload => {
                self.stream.close();
            },
            PageSignal::LinkClick(link) => {
                let page_url = self.document.current_url();
                if should_close_for_link(link, page_url.as_ref()) {
                    log::debug!("live-link: leaving page, closing stream early");
                    self.stream.close();
                }
            },
        }
        self.stream.state()
    }

    /// Re-read the document's visibility after a `visibilitychange`
    pub fn on_visibility_change(&self) -> StreamState {
        let visibility = self.document.visibility();
        self.handle(&PageSignal::VisibilityChanged(visibility))
    }
}

/// Whether following `link` navigates this tab away from the page.
///
/// Exempt: new-tab targets, downloads, fragment-only hrefs, other origins,
/// and links that only change the hash of the current page. Clicks with a
/// non-primary button or a modifier key open elsewhere and are exempt too.
pub fn should_close_for_link(link: &LinkClick, page_url: Option<&Url>) -> bool {
    if link.button != 0 || link.modified {
        return false;
    }
    if let Some(target) = link.target.as_deref() {
        if !target.is_empty() && !target.eq_ignore_ascii_case("_self") {
            return false;
        }
    }
    if link.download {
        return false;
    }
    let href = link.href.as_deref().unwrap_or_default();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }
    let Some(page_url) = page_url else {
        return false;
    };
    let url = match resolve(href, Some(page_url)) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("live-link: ignoring click: {}", e);
            return false;
        },
    };
    if url.origin() != page_url.origin() {
        return false;
    }
    let same_document = url.path() == page_url.path() && url.query() == page_url.query();
    if same_document && url.fragment().is_some_and(|hash| !hash.is_empty()) {
        return false;
    }
    true
}
