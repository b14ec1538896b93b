use url::Url;

use crate::error::{LiveLinkError, Result};
use crate::host::{OutboundForm, RequestHeaders};
use crate::models::{LiveOptions, OriginId};

/// How a submission was tagged with the origin id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// GET submission, nothing to tag
    Skipped,
    /// Framework form; the origin id travels as a request header
    ViaHeader,
    /// Plain form; origin id set on the action query and a hidden field
    ViaForm,
}

/// Attaches the tab's origin id to state-changing requests so the server
/// can echo it back in the change notification.
///
/// A framework-handled form is tagged only through the request header, a
/// plain form only through its action URL and hidden field.
pub struct OutboundTagger {
    origin_id: OriginId,
    header: String,
    field: String,
    framework_attributes: Vec<String>,
}

impl OutboundTagger {
    pub fn new(origin_id: OriginId, options: &LiveOptions) -> Self {
        Self {
            origin_id,
            header: options.origin_header.clone(),
            field: options.origin_field.clone(),
            framework_attributes: options.framework_attributes.clone(),
        }
    }

    pub fn origin_id(&self) -> &OriginId {
        &self.origin_id
    }

    /// Whether the AJAX framework will submit `form` itself
    pub fn is_framework_form(&self, form: &dyn OutboundForm) -> bool {
        self.framework_attributes
            .iter()
            .any(|attr| form.has_attribute(attr))
    }

    /// Handle a document-level `submit` event.
    ///
    /// `base` resolves relative action URLs, normally the page URL.
    pub fn on_submit(&self, form: &dyn OutboundForm, base: Option<&Url>) -> Result<TagOutcome> {
        if is_read_only_method(&form.method()) {
            return Ok(TagOutcome::Skipped);
        }
        if self.is_framework_form(form) {
            return Ok(TagOutcome::ViaHeader);
        }

        let action = form.action();
        let tagged = with_origin_query(&action, base, &self.field, self.origin_id.as_str());
        if tagged != action {
            form.set_action(&tagged);
        }
        self.ensure_origin_field(form)?;
        Ok(TagOutcome::ViaForm)
    }

    /// Create the hidden origin field, or update it when already present.
    /// A field already holding this tab's id is left untouched.
    pub fn ensure_origin_field(&self, form: &dyn OutboundForm) -> Result<()> {
        let origin = self.origin_id.as_str();
        match form.field_value(&self.field) {
            Some(current) if current == origin => Ok(()),
            Some(_) if form.set_field_value(&self.field, origin) => Ok(()),
            _ => form.append_hidden_field(&self.field, origin),
        }
    }

    /// Handle the framework's request-configuration event.
    ///
    /// Returns `true` when the header was attached.
    pub fn configure_request(&self, verb: &str, headers: &mut dyn RequestHeaders) -> Result<bool> {
        if is_read_only_method(verb) {
            return Ok(false);
        }
        headers.set_header(&self.header, self.origin_id.as_str())?;
        Ok(true)
    }
}

fn is_read_only_method(method: &str) -> bool {
    let method = method.trim();
    method.is_empty() || method.eq_ignore_ascii_case("get")
}

/// Set `field=origin_id` on `url`'s query, replacing any existing values.
///
/// Relative URLs resolve against `base`. An empty or unparseable URL is
/// returned unchanged.
pub fn with_origin_query(url: &str, base: Option<&Url>, field: &str, origin_id: &str) -> String {
    if url.is_empty() || origin_id.is_empty() {
        return url.to_string();
    }
    match resolve(url, base) {
        Ok(mut parsed) => {
            set_query_param(&mut parsed, field, origin_id);
            parsed.to_string()
        },
        Err(e) => {
            log::debug!("live-link: leaving form action untouched: {}", e);
            url.to_string()
        },
    }
}

pub(crate) fn resolve(url: &str, base: Option<&Url>) -> Result<Url> {
    let parsed = match base {
        Some(base) => base.join(url),
        None => Url::parse(url),
    };
    parsed.map_err(|e| LiveLinkError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Replace all `name` pairs with a single one, keeping the position of the
/// first occurrence.
fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != name {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_string()))
        })
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    query.extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if !replaced {
        query.append_pair(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Form recording every write the tagger makes
    #[derive(Default)]
    struct RecordingForm {
        fields: RefCell<Vec<(String, String)>>,
        updates: Cell<usize>,
        appends: Cell<usize>,
    }

    impl OutboundForm for RecordingForm {
        fn method(&self) -> String {
            "post".to_string()
        }

        fn has_attribute(&self, _name: &str) -> bool {
            false
        }

        fn action(&self) -> String {
            "https://gym.example/plans".to_string()
        }

        fn set_action(&self, _url: &str) {}

        fn field_value(&self, name: &str) -> Option<String> {
            self.fields
                .borrow()
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
        }

        fn set_field_value(&self, name: &str, value: &str) -> bool {
            let mut fields = self.fields.borrow_mut();
            match fields.iter_mut().find(|(field, _)| field == name) {
                Some(field) => {
                    field.1 = value.to_string();
                    self.updates.set(self.updates.get() + 1);
                    true
                },
                None => false,
            }
        }

        fn append_hidden_field(&self, name: &str, value: &str) -> Result<()> {
            self.fields.borrow_mut().push((name.to_string(), value.to_string()));
            self.appends.set(self.appends.get() + 1);
            Ok(())
        }
    }

    fn tagger() -> OutboundTagger {
        OutboundTagger::new(OriginId::new("tab-1"), &LiveOptions::default())
    }

    #[test]
    fn test_ensure_origin_field_appends_then_keeps_current_value() {
        let tagger = tagger();
        let form = RecordingForm::default();

        tagger.ensure_origin_field(&form).unwrap();
        tagger.ensure_origin_field(&form).unwrap();

        assert_eq!(form.appends.get(), 1);
        assert_eq!(form.updates.get(), 0, "a field already holding the id is not rewritten");
        assert_eq!(form.field_value("origin_id").as_deref(), Some("tab-1"));
    }

    #[test]
    fn test_ensure_origin_field_overwrites_stale_value() {
        let tagger = tagger();
        let form = RecordingForm::default();
        form.fields
            .borrow_mut()
            .push(("origin_id".to_string(), "tab-other".to_string()));

        tagger.ensure_origin_field(&form).unwrap();

        assert_eq!(form.updates.get(), 1);
        assert_eq!(form.appends.get(), 0);
        assert_eq!(form.field_value("origin_id").as_deref(), Some("tab-1"));
    }

    fn base() -> Url {
        Url::parse("https://gym.example/students?page=2").unwrap()
    }

    #[test]
    fn test_with_origin_query_appends_param() {
        let url = with_origin_query("https://gym.example/students/7", None, "origin_id", "abc");
        assert_eq!(url, "https://gym.example/students/7?origin_id=abc");
    }

    #[test]
    fn test_with_origin_query_overwrites_existing_param() {
        let url = with_origin_query(
            "https://gym.example/plans?origin_id=old&x=1&origin_id=older",
            None,
            "origin_id",
            "abc",
        );
        assert_eq!(url, "https://gym.example/plans?origin_id=abc&x=1");
    }

    #[test]
    fn test_with_origin_query_resolves_relative_action() {
        let url = with_origin_query("/payments?sort=desc", Some(&base()), "origin_id", "abc");
        assert_eq!(url, "https://gym.example/payments?sort=desc&origin_id=abc");
    }

    #[test]
    fn test_with_origin_query_passes_through_unparseable_url() {
        assert_eq!(with_origin_query("http://[::1", None, "origin_id", "abc"), "http://[::1");
        assert_eq!(with_origin_query("", Some(&base()), "origin_id", "abc"), "");
    }

    #[test]
    fn test_read_only_methods() {
        assert!(is_read_only_method("GET"));
        assert!(is_read_only_method("get"));
        assert!(is_read_only_method(""));
        assert!(!is_read_only_method("post"));
        assert!(!is_read_only_method("DELETE"));
    }
}
