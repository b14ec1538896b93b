use std::rc::Rc;

use url::Url;

use crate::host::PageDocument;
use crate::models::{ChangeEvent, OriginId, Topic};

/// How subscribed elements are brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStrategy {
    /// GET each element's fragment URL and swap its outer markup
    Fragment,
    /// Reload the whole page
    FullReload,
}

impl RefreshStrategy {
    /// Pick the strategy the page can support right now
    pub fn detect(document: &dyn PageDocument) -> Self {
        if document.supports_fragment_swap() {
            RefreshStrategy::Fragment
        } else {
            RefreshStrategy::FullReload
        }
    }
}

/// Result of handling one change event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event echoed this tab's own write
    Suppressed,
    /// No element with a refresh URL is subscribed to the topic
    NoTargets,
    /// Fragment swaps issued per target
    Refreshed {
        refreshed: usize,
        skipped: usize,
        failed: usize,
    },
    /// The whole page was reloaded
    Reloaded,
}

/// Routes decoded change events to the page elements subscribed to them.
///
/// Targets are re-queried from the document on every event; nothing is
/// retained between dispatches.
pub struct RefreshDispatcher {
    origin_id: OriginId,
    document: Rc<dyn PageDocument>,
}

impl RefreshDispatcher {
    pub fn new(origin_id: OriginId, document: Rc<dyn PageDocument>) -> Self {
        Self {
            origin_id,
            document,
        }
    }

    /// Handle the raw payload of an event received for `topic`
    pub fn on_event(&self, topic: &Topic, raw: &str) -> DispatchOutcome {
        let event = ChangeEvent::decode(topic.clone(), raw);
        self.dispatch(&event)
    }

    pub fn dispatch(&self, event: &ChangeEvent) -> DispatchOutcome {
        if let Some(origin) = event.origin_id.as_deref() {
            if self.origin_id.matches(origin) {
                log::debug!(
                    "live-link: ignoring {} change caused by this tab ({} {})",
                    event.topic,
                    event.method.as_deref().unwrap_or("?"),
                    event.path.as_deref().unwrap_or("?")
                );
                return DispatchOutcome::Suppressed;
            }
        }

        let page_url = self.document.current_url();
        let targets = self.document.targets_for(&event.topic);

        match RefreshStrategy::detect(self.document.as_ref()) {
            RefreshStrategy::Fragment => {
                let mut refreshed = 0;
                let mut skipped = 0;
                let mut failed = 0;
                for target in &targets {
                    let Some(url) = build_refresh_url(target.declared_url(), page_url.as_ref())
                    else {
                        skipped += 1;
                        continue;
                    };
                    match target.swap_from(&url) {
                        Ok(()) => refreshed += 1,
                        Err(e) => {
                            failed += 1;
                            log::warn!("live-link: refresh of {} failed: {}", url, e);
                        },
                    }
                }
                if refreshed + failed == 0 {
                    return DispatchOutcome::NoTargets;
                }
                log::debug!(
                    "live-link: {} change refreshed {} element(s), {} failed",
                    event.topic,
                    refreshed,
                    failed
                );
                DispatchOutcome::Refreshed {
                    refreshed,
                    skipped,
                    failed,
                }
            },
            RefreshStrategy::FullReload => {
                let any_refreshable = targets.iter().any(|target| {
                    build_refresh_url(target.declared_url(), page_url.as_ref()).is_some()
                });
                if !any_refreshable {
                    return DispatchOutcome::NoTargets;
                }
                log::info!(
                    "live-link: fragment swap unavailable, reloading page for {}",
                    event.topic
                );
                self.document.reload();
                DispatchOutcome::Reloaded
            },
        }
    }
}

/// Fragment URL for a target.
///
/// A declared URL without a query string inherits the page's query string
/// so filtered or paginated fragments stay in sync with the page.
pub fn build_refresh_url(declared: Option<String>, page_url: Option<&Url>) -> Option<String> {
    let declared = declared.filter(|url| !url.is_empty())?;
    if declared.contains('?') {
        return Some(declared);
    }
    match page_url.and_then(Url::query).filter(|query| !query.is_empty()) {
        Some(query) => Some(format!("{}?{}", declared, query)),
        None => Some(declared),
    }
}
