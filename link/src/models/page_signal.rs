/// Visibility of the tab as reported by the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Snapshot of the anchor closest to a click target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// Raw `href` attribute, not resolved
    pub href: Option<String>,
    /// Raw `target` attribute
    pub target: Option<String>,
    /// Whether the anchor carries a `download` attribute
    pub download: bool,
    /// Mouse button (`0` is the primary button)
    pub button: i16,
    /// Ctrl, Meta, Shift or Alt held during the click
    pub modified: bool,
}

impl LinkClick {
    /// Plain primary-button click on `href`
    pub fn to(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_modifier(mut self) -> Self {
        self.modified = true;
        self
    }
}

/// Browser lifecycle signals the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSignal {
    /// `visibilitychange`
    VisibilityChanged(Visibility),
    /// `pageshow`; `persisted` is set when restored from the back/forward cache
    PageShow { persisted: bool },
    /// `pagehide`
    PageHide,
    /// `beforeunload`
    BeforeUnload,
    /// `click` landing on (or inside) an anchor
    LinkClick(LinkClick),
}
