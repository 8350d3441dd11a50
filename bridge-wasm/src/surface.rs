//! The player element and the status line.
//!
//! [`DomPlayerSurface`] owns `#yoyaku-player`, a fixed bar appended to
//! `<body>`. Its static skeleton is inserted once; product data only ever
//! goes through `textContent` and attributes. Clicks and slider input inside
//! the element are delegated to a single pair of listeners that translate
//! them into [`ControlAction`]s.

use std::cell::RefCell;
use std::rc::Rc;

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::page::{
    ControlAction, ControlHandler, PlayerSurface, ProductView, StatusMessage, StatusSurface,
    StatusTone,
};
use gloo_timers::callback::Timeout;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, MouseEvent};

use crate::error::{js_error, WasmError, WasmResult};
use crate::listener::EventListener;

pub const PLAYER_ELEMENT_ID: &str = "yoyaku-player";
pub const STATUS_ELEMENT_ID: &str = "player-status";

const PLAYER_SKELETON: &str = r#"<div class="player-inner">
  <div class="vinyl-cover"><div class="vinyl-wrapper"><img class="vinyl-image" alt=""></div></div>
  <div class="playlist-container">
    <div class="playlist-toggle">
      <div class="playlist-info">
        <div class="product-line-1"><span class="product-artist">--</span> - <span class="product-title">No product loaded</span></div>
        <div class="product-line-2"><span class="product-label">--</span> - <span class="product-sku">--</span></div>
      </div>
      <div class="track-display"><span class="current-track">-- | No track</span><span class="dropdown-arrow">&#9660;</span></div>
    </div>
    <div class="playlist-dropdown"></div>
  </div>
  <div class="waveform-container">
    <div id="waveform"></div>
    <div class="html5-progress-container">
      <div class="progress-bar"><div class="progress-fill"></div></div>
      <div class="time-display">0:00 / 0:00</div>
    </div>
  </div>
  <div class="player-controls">
    <button type="button" class="control-btn prev" title="Previous">&#9668;&#9668;</button>
    <button type="button" class="control-btn play-pause" title="Play/Pause"><span class="btn-play">&#9654;</span><span class="btn-pause" style="display:none">&#10074;&#10074;</span></button>
    <button type="button" class="control-btn next" title="Next">&#9658;&#9658;</button>
    <div class="audio-controls">
      <div class="volume-control" title="Volume">
        <input type="range" class="volume-slider-horizontal" min="0" max="100" value="80">
        <span class="volume-value">80%</span>
      </div>
      <div class="pitch-control desktop-only" title="Pitch">
        <button type="button" class="pitch-down">-</button>
        <button type="button" class="pitch-reset">0</button>
        <button type="button" class="pitch-up">+</button>
      </div>
    </div>
    <button type="button" class="cart-btn" title="Add to cart">Add to cart</button>
  </div>
</div>"#;

/// Map a click target inside the player to the control it belongs to.
fn control_for(target: &Element) -> Option<ControlAction> {
    let closest = |selector: &str| target.closest(selector).ok().flatten();

    if closest(".play-pause").is_some() {
        return Some(ControlAction::TogglePlayPause);
    }
    if closest(".prev").is_some() {
        return Some(ControlAction::Previous);
    }
    if closest(".next").is_some() {
        return Some(ControlAction::Next);
    }
    if closest(".cart-btn").is_some() {
        return Some(ControlAction::AddToCart);
    }
    if closest(".pitch-down").is_some() {
        return Some(ControlAction::AdjustPitch(-1));
    }
    if closest(".pitch-up").is_some() {
        return Some(ControlAction::AdjustPitch(1));
    }
    if closest(".pitch-reset").is_some() {
        return Some(ControlAction::ResetPitch);
    }
    closest(".playlist-item")
        .and_then(|item| item.get_attribute("data-index"))
        .and_then(|index| index.parse().ok())
        .map(ControlAction::SelectTrack)
}

pub struct DomPlayerSurface {
    document: Document,
    root: RefCell<Option<HtmlElement>>,
    controls: Rc<RefCell<Option<ControlHandler>>>,
    listeners: RefCell<Vec<EventListener>>,
}

impl DomPlayerSurface {
    pub fn new() -> WasmResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| WasmError::NotAvailable("document".into()))?;
        Ok(Self {
            document,
            root: RefCell::new(None),
            controls: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn root(&self) -> Option<HtmlElement> {
        self.root.borrow().clone()
    }

    fn find(&self, selector: &str) -> Option<Element> {
        self.root()?.query_selector(selector).ok().flatten()
    }

    fn set_text(&self, selector: &str, text: &str) {
        if let Some(element) = self.find(selector) {
            element.set_text_content(Some(text));
        }
    }

    fn create_root(&self) -> WasmResult<HtmlElement> {
        let root = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| WasmError::JavaScript("div is not an HtmlElement".into()))?;
        root.set_id(PLAYER_ELEMENT_ID);
        root.set_class_name("yoyaku-player-ultra-fin");
        root.set_inner_html(PLAYER_SKELETON);

        let body = self
            .document
            .body()
            .ok_or_else(|| WasmError::NotAvailable("document body".into()))?;
        body.append_child(&root)?;
        Ok(root)
    }

    fn install_listeners(&self, root: &HtmlElement) -> WasmResult<()> {
        let mut listeners = self.listeners.borrow_mut();

        let controls = Rc::clone(&self.controls);
        let clicked_root = root.clone();
        listeners.push(EventListener::new(root, "click", move |event: Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };

            if target.closest(".playlist-toggle").ok().flatten().is_some() {
                let _ = clicked_root.class_list().toggle("playlist-open");
                return;
            }

            let action = match target.closest(".progress-bar").ok().flatten() {
                Some(bar) => event.dyn_ref::<MouseEvent>().map(|click| {
                    let rect = bar.get_bounding_client_rect();
                    ControlAction::SeekClick {
                        offset_x: f64::from(click.client_x()) - rect.left(),
                        width: rect.width(),
                    }
                }),
                None => control_for(&target),
            };

            if let Some(action) = action {
                event.prevent_default();
                dispatch(&controls, action);
            }
        })?);

        let controls = Rc::clone(&self.controls);
        let input_root = root.clone();
        listeners.push(EventListener::new(root, "input", move |event: Event| {
            let Some(slider) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                .filter(|input| input.class_list().contains("volume-slider-horizontal"))
            else {
                return;
            };
            let Ok(percent) = slider.value().parse::<i32>() else {
                return;
            };
            if let Ok(Some(label)) = input_root.query_selector(".volume-value") {
                label.set_text_content(Some(&format!("{percent}%")));
            }
            dispatch(&controls, ControlAction::SetVolume(percent));
        })?);

        Ok(())
    }

    fn rebuild_playlist(&self, view: &ProductView) -> WasmResult<()> {
        let Some(dropdown) = self.find(".playlist-dropdown") else {
            return Ok(());
        };
        dropdown.set_inner_html("");

        for (index, track) in view.tracks.iter().enumerate() {
            let item = self.document.create_element("div")?;
            item.set_class_name("playlist-item");
            item.set_attribute("data-index", &index.to_string())?;

            let name = self.document.create_element("span")?;
            name.set_class_name("track-name");
            name.set_text_content(Some(&track.name));
            item.append_child(&name)?;

            if let Some(bpm) = track.bpm {
                let badge = self.document.create_element("span")?;
                badge.set_class_name("track-bpm");
                badge.set_text_content(Some(&format!("{bpm} BPM")));
                item.append_child(&badge)?;
            }
            if let Some(duration) = &track.duration {
                let length = self.document.create_element("span")?;
                length.set_class_name("track-duration");
                length.set_text_content(Some(duration));
                item.append_child(&length)?;
            }

            dropdown.append_child(&item)?;
        }
        Ok(())
    }
}

fn dispatch(controls: &Rc<RefCell<Option<ControlHandler>>>, action: ControlAction) {
    // Clone out so the handler may rebind controls.
    let handler = controls.borrow().clone();
    match handler {
        Some(handler) => handler(action),
        None => debug!(?action, "player control used before controls were bound"),
    }
}

fn toggle_display(element: Option<Element>, visible: bool) {
    if let Some(element) = element.and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
        let value = if visible { "inline" } else { "none" };
        let _ = element.style().set_property("display", value);
    }
}

impl PlayerSurface for DomPlayerSurface {
    fn mount(&self) -> BridgeResult<()> {
        if self.root().is_some_and(|root| root.is_connected()) {
            return Ok(());
        }

        let existing = self
            .document
            .get_element_by_id(PLAYER_ELEMENT_ID)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        let root = match existing {
            Some(root) => root,
            None => self.create_root()?,
        };

        self.listeners.borrow_mut().clear();
        self.install_listeners(&root)?;
        *self.root.borrow_mut() = Some(root);
        debug!("player element mounted");
        Ok(())
    }

    fn render_product(&self, view: &ProductView) -> BridgeResult<()> {
        let root = self
            .root()
            .ok_or_else(|| BridgeError::from(WasmError::ElementNotFound(PLAYER_ELEMENT_ID.into())))?;

        self.set_text(".product-artist", &view.artist);
        self.set_text(".product-title", &view.title);
        self.set_text(".product-label", &view.label);
        self.set_text(".product-sku", &view.sku);
        self.set_text(".current-track", "-- | No track");

        if let Some(image) = self.find(".vinyl-image") {
            let result = match &view.cover {
                Some(cover) => image.set_attribute("src", cover),
                None => image.remove_attribute("src"),
            };
            result.map_err(|err| js_error("set cover", err))?;
            image
                .set_attribute("alt", &view.title)
                .map_err(|err| js_error("set cover alt", err))?;
        }

        self.rebuild_playlist(view)?;
        root.set_attribute("data-product", &view.product_id)
            .map_err(|err| js_error("tag player", err))?;
        let _ = root.class_list().add_1("active");
        Ok(())
    }

    fn highlight_track(&self, index: usize, name: &str) {
        let Some(root) = self.root() else {
            return;
        };
        if let Ok(items) = root.query_selector_all(".playlist-item") {
            let wanted = index.to_string();
            for item in (0..items.length())
                .filter_map(|i| items.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
            {
                let active = item.get_attribute("data-index").as_deref() == Some(wanted.as_str());
                let _ = item.class_list().toggle_with_force("active", active);
            }
        }
        self.set_text(".current-track", &format!("{} | {}", index + 1, name));
    }

    fn set_playing(&self, playing: bool) {
        if let Some(root) = self.root() {
            let _ = root.class_list().toggle_with_force("playing", playing);
        }
        toggle_display(self.find(".btn-play"), !playing);
        toggle_display(self.find(".btn-pause"), playing);
    }

    fn set_progress(&self, fraction: f64, label: &str) {
        if let Some(fill) = self
            .find(".progress-fill")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        {
            let width = format!("{:.2}%", fraction.clamp(0.0, 1.0) * 100.0);
            let _ = fill.style().set_property("width", &width);
        }
        self.set_text(".time-display", label);
    }

    fn set_layout(&self, compact: bool, iphone: bool) {
        if let Some(root) = self.root() {
            let classes = root.class_list();
            let _ = classes.toggle_with_force("mobile-layout", compact);
            let _ = classes.toggle_with_force("iphone-device", iphone);
        }
        if let Some(line) = self.find(".product-line-2") {
            let _ = line.class_list().toggle_with_force("mobile-hidden", compact);
        }
    }

    fn bind_controls(&self, handler: ControlHandler) {
        *self.controls.borrow_mut() = Some(handler);
    }
}

/// Toast-style status line, `#player-status`.
pub struct DomStatusSurface {
    document: Document,
    dismiss: RefCell<Option<Timeout>>,
}

impl DomStatusSurface {
    pub fn new() -> WasmResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| WasmError::NotAvailable("document".into()))?;
        Ok(Self {
            document,
            dismiss: RefCell::new(None),
        })
    }

    fn element(&self) -> WasmResult<Element> {
        if let Some(element) = self.document.get_element_by_id(STATUS_ELEMENT_ID) {
            return Ok(element);
        }
        let element = self.document.create_element("div")?;
        element.set_id(STATUS_ELEMENT_ID);
        element.set_class_name("status-indicator");
        element.set_attribute("role", "status")?;
        element.set_attribute("aria-live", "polite")?;
        self.document
            .body()
            .ok_or_else(|| WasmError::NotAvailable("document body".into()))?
            .append_child(&element)?;
        Ok(element)
    }
}

fn tone_class(tone: StatusTone) -> &'static str {
    match tone {
        StatusTone::Info => "status-info",
        StatusTone::Success => "status-success",
        StatusTone::Error => "status-error",
    }
}

impl StatusSurface for DomStatusSurface {
    fn show(&self, message: &StatusMessage) {
        let element = match self.element() {
            Ok(element) => element,
            Err(e) => {
                warn!(error = %e, text = %message.text, "status line unavailable");
                return;
            }
        };

        element.set_text_content(Some(&message.text));
        element.set_class_name(&format!(
            "status-indicator visible {}",
            tone_class(message.tone)
        ));

        let millis = message.dismiss_after.as_millis().min(u32::MAX as u128) as u32;
        let hide = element.clone();
        // Replacing the timer cancels the previous one.
        *self.dismiss.borrow_mut() = Some(Timeout::new(millis, move || {
            let _ = hide.class_list().remove_1("visible");
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn tone_classes_are_distinct() {
        assert_eq!(tone_class(StatusTone::Info), "status-info");
        assert_eq!(tone_class(StatusTone::Success), "status-success");
        assert_eq!(tone_class(StatusTone::Error), "status-error");
    }
}
