use std::collections::BTreeSet;

use crate::host::PageDocument;
use crate::models::Topic;

/// Derives the active topic set from the live DOM.
///
/// Nothing is cached: fragment swaps can add or remove subscribed
/// elements between two scans.
pub struct TopicRegistry;

impl TopicRegistry {
    /// Distinct non-blank topics declared in `document`
    pub fn collect(document: &dyn PageDocument) -> BTreeSet<Topic> {
        document
            .declared_topics()
            .iter()
            .filter_map(|raw| Topic::parse(raw))
            .collect()
    }
}
