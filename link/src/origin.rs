use std::cell::RefCell;
use std::rc::Rc;

use crate::host::SessionStore;
use crate::models::OriginId;

/// Per-tab origin identifier, persisted in session storage.
///
/// The first call in a tab session generates an id and stores it; every
/// later call, including from a fresh page load in the same tab, returns
/// the stored value. Without usable storage the id lives only in this
/// instance.
pub struct OriginIdentity {
    store: Option<Rc<dyn SessionStore>>,
    key: String,
    cached: RefCell<Option<OriginId>>,
}

impl OriginIdentity {
    pub fn new(store: Option<Rc<dyn SessionStore>>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cached: RefCell::new(None),
        }
    }

    /// Return this tab's origin id, creating and persisting it on first use
    pub fn get_or_create(&self) -> OriginId {
        if let Some(id) = self.cached.borrow().as_ref() {
            return id.clone();
        }

        let id = match self.load() {
            Some(existing) => existing,
            None => {
                let fresh = generate_origin_id();
                self.persist(&fresh);
                fresh
            },
        };
        *self.cached.borrow_mut() = Some(id.clone());
        id
    }

    fn load(&self) -> Option<OriginId> {
        let store = self.store.as_ref()?;
        match store.get_item(&self.key) {
            Ok(Some(value)) if !value.is_empty() => Some(OriginId::new(value)),
            Ok(_) => None,
            Err(e) => {
                log::warn!("live-link: cannot read origin id: {}", e);
                None
            },
        }
    }

    fn persist(&self, id: &OriginId) {
        let Some(store) = self.store.as_ref() else {
            log::debug!("live-link: no session storage, origin id kept in memory");
            return;
        };
        if let Err(e) = store.set_item(&self.key, id.as_str()) {
            log::warn!("live-link: cannot persist origin id, keeping it in memory: {}", e);
        }
    }
}

/// Generate a fresh origin id.
///
/// A v4 UUID when the platform random source works, otherwise
/// `oid-<unix millis>-<hex>`.
pub fn generate_origin_id() -> OriginId {
    let mut bytes = [0u8; 16];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => OriginId::new(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()),
        Err(e) => {
            log::debug!("live-link: random source unavailable ({}), using fallback id", e);
            fallback_origin_id(now_millis())
        },
    }
}

pub(crate) fn fallback_origin_id(millis: u64) -> OriginId {
    OriginId::new(format!("oid-{}-{:x}", millis, fallback_suffix(millis)))
}

// std seeds `RandomState` with fixed keys on wasm32-unknown-unknown, so the
// browser build draws the suffix from `Math.random()` instead.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn fallback_suffix(_millis: u64) -> u64 {
    (js_sys::Math::random() * (1u64 << 53) as f64) as u64
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn fallback_suffix(millis: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    millis.hash(&mut hasher);
    hasher.finish()
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
