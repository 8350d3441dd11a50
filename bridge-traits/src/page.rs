//! Host page bridge traits.
//!
//! [`PageHost`] exposes the parts of the surrounding storefront page the core
//! needs: trigger discovery, click interception, hiding of competing players,
//! viewport facts and the product context WordPress prints into the page.
//! [`PlayerSurface`] and [`StatusSurface`] are the output side: the singleton
//! player element and the transient status line.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::{error::Result, platform::PlatformSendSync};

/// Host-assigned identity of a page element. Stable for the element's
/// lifetime, never reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Snapshot of a page element as seen when it was queried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageElement {
    pub id: ElementId,
    /// Lower-case tag name, e.g. `a` or `button`.
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub text: String,
}

impl PageElement {
    pub fn new(id: u64, tag: impl Into<String>) -> Self {
        Self {
            id: ElementId(id),
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Invoked by the host after it cancelled the default navigation of a click.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// Invoked after the viewport was resized or the device rotated.
pub type ResizeHandler = Arc<dyn Fn() + Send + Sync>;

/// Viewport facts used for layout detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub user_agent: String,
    pub touch: bool,
}

/// Product hints printed into the page by the storefront.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContext {
    /// Product id from the localized player settings object.
    pub localized_product_id: Option<String>,
    /// Raw `class` attribute of `<body>`.
    pub body_class: String,
    /// `value` of the add-to-cart button inside the product form.
    pub add_to_cart_value: Option<String>,
    /// Content of a `product:id` style meta tag.
    pub meta_product_id: Option<String>,
}

/// Access to the page hosting the player.
pub trait PageHost: PlatformSendSync {
    /// Elements matching a CSS selector list, in document order.
    fn query(&self, selector: &str) -> Result<Vec<PageElement>>;

    /// Intercept clicks on `element`: prevent the default navigation, stop
    /// propagation, then invoke `handler`.
    fn bind_click(&self, element: ElementId, handler: ClickHandler) -> Result<()>;

    /// Hide every element matching `selector`. Returns how many were hidden.
    fn hide(&self, selector: &str) -> Result<usize>;

    fn viewport(&self) -> Viewport;

    /// Call `handler` on every resize and orientation change.
    fn on_resize(&self, handler: ResizeHandler) -> Result<()>;

    fn page_context(&self) -> PageContext;
}

/// Display data for the singleton player element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductView {
    pub product_id: String,
    pub title: String,
    pub artist: String,
    pub label: String,
    pub cover: Option<String>,
    pub sku: String,
    pub tracks: Vec<TrackView>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackView {
    pub name: String,
    pub bpm: Option<u32>,
    pub duration: Option<String>,
}

/// A user action on the player element's own controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    TogglePlayPause,
    Next,
    Previous,
    /// Playlist row, 0-based.
    SelectTrack(usize),
    /// Click on the progress area at `offset_x` of `width` pixels. Only the
    /// plain backend's bar reports these; the waveform seeks on its own.
    SeekClick { offset_x: f64, width: f64 },
    /// Volume slider position, 0 to 100.
    SetVolume(i32),
    /// Pitch fader nudged by `delta` steps.
    AdjustPitch(i32),
    ResetPitch,
    AddToCart,
}

/// Receives [`ControlAction`]s from the player element.
pub type ControlHandler = Arc<dyn Fn(ControlAction) + Send + Sync>;

/// The singleton player element.
pub trait PlayerSurface: PlatformSendSync {
    /// Attach the player element to the document. Calling it again while the
    /// element is attached does nothing.
    fn mount(&self) -> Result<()>;

    fn render_product(&self, view: &ProductView) -> Result<()>;

    fn highlight_track(&self, index: usize, name: &str);

    fn set_playing(&self, playing: bool);

    /// `fraction` is in `0.0..=1.0`; `label` is pre-formatted (`1:05 / 3:20`).
    fn set_progress(&self, fraction: f64, label: &str);

    fn set_layout(&self, compact: bool, iphone: bool);

    /// Route clicks on the element's controls to `handler`. Replaces any
    /// previous handler.
    fn bind_controls(&self, handler: ControlHandler);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Success,
    Error,
}

/// A transient message for the status line.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub tone: StatusTone,
    pub text: String,
    /// How long the host keeps the message visible.
    pub dismiss_after: Duration,
}

/// Output channel for status messages. The host owns the dismiss timer.
pub trait StatusSurface: PlatformSendSync {
    fn show(&self, message: &StatusMessage);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_element_accessors() {
        let element = PageElement::new(7, "a")
            .with_class("fwaplay")
            .with_attr("data-product", "1234")
            .with_text("Play");

        assert_eq!(element.id, ElementId(7));
        assert!(element.has_class("fwaplay"));
        assert!(!element.has_class("play-all"));
        assert_eq!(element.attr("data-product"), Some("1234"));
        assert_eq!(element.attr("href"), None);
    }
}
