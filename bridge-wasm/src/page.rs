//! DOM implementation of [`PageHost`].
//!
//! Queried elements are registered under a numeric id that is also written
//! to a `data-vinyl-id` attribute, so a rescan of the same node yields the
//! same [`ElementId`] and the binder can skip it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::page::{
    ClickHandler, ElementId, PageContext, PageElement, PageHost, ResizeHandler, Viewport,
};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

use crate::error::{js_error, WasmError, WasmResult};
use crate::listener::EventListener;

/// Attribute carrying the registry id of a queried element.
pub const ELEMENT_ID_ATTRIBUTE: &str = "data-vinyl-id";

const ADD_TO_CART_SELECTOR: &str =
    "form.cart button[name=\"add-to-cart\"], form.cart input[name=\"add-to-cart\"]";
const PRODUCT_META_SELECTOR: &str = "meta[property=\"product:id\"], meta[name=\"product_id\"]";

pub struct DomPageHost {
    window: Window,
    document: Document,
    localized_product_id: Option<String>,
    registry: RefCell<HashMap<u64, Element>>,
    next_id: Cell<u64>,
    listeners: RefCell<Vec<EventListener>>,
}

impl DomPageHost {
    /// `localized_product_id` is the product id the storefront printed into
    /// the player settings object, if any.
    pub fn new(localized_product_id: Option<String>) -> WasmResult<Self> {
        let window = web_sys::window().ok_or_else(|| WasmError::NotAvailable("window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| WasmError::NotAvailable("document".into()))?;
        Ok(Self {
            window,
            document,
            localized_product_id,
            registry: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn register(&self, element: &Element) -> ElementId {
        let existing = element
            .get_attribute(ELEMENT_ID_ATTRIBUTE)
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|id| self.registry.borrow().contains_key(id));
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                let _ = element.set_attribute(ELEMENT_ID_ATTRIBUTE, &id.to_string());
                id
            }
        };
        self.registry.borrow_mut().insert(id, element.clone());
        ElementId(id)
    }

    fn select_all(&self, selector: &str) -> BridgeResult<Vec<Element>> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|err| js_error(&format!("query '{selector}'"), err))?;
        Ok((0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn first_attribute(&self, selector: &str, attribute: &str) -> Option<String> {
        self.document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.get_attribute(attribute))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

fn snapshot(id: ElementId, element: &Element) -> PageElement {
    let mut attributes = HashMap::new();
    let names = element.get_attribute_names();
    for name in names.iter().filter_map(|name| name.as_string()) {
        if let Some(value) = element.get_attribute(&name) {
            attributes.insert(name, value);
        }
    }

    PageElement {
        id,
        tag: element.tag_name().to_lowercase(),
        classes: element
            .class_name()
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        attributes,
        text: element
            .text_content()
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

impl PageHost for DomPageHost {
    fn query(&self, selector: &str) -> BridgeResult<Vec<PageElement>> {
        Ok(self
            .select_all(selector)?
            .iter()
            .map(|element| snapshot(self.register(element), element))
            .collect())
    }

    fn bind_click(&self, element: ElementId, handler: ClickHandler) -> BridgeResult<()> {
        let target = self
            .registry
            .borrow()
            .get(&element.0)
            .cloned()
            .ok_or_else(|| {
                BridgeError::from(WasmError::ElementNotFound(format!("element {}", element.0)))
            })?;

        let listener = EventListener::new(&target, "click", move |event| {
            event.prevent_default();
            event.stop_propagation();
            handler();
        })?;
        self.listeners.borrow_mut().push(listener);
        Ok(())
    }

    fn hide(&self, selector: &str) -> BridgeResult<usize> {
        let mut hidden = 0;
        for element in self.select_all(selector)? {
            if let Ok(element) = element.dyn_into::<HtmlElement>() {
                element
                    .style()
                    .set_property("display", "none")
                    .map_err(|err| js_error("hide element", err))?;
                hidden += 1;
            }
        }
        Ok(hidden)
    }

    fn viewport(&self) -> Viewport {
        let navigator = self.window.navigator();
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or_default();
        let touch = js_sys::Reflect::has(&self.window, &JsValue::from_str("ontouchstart"))
            .unwrap_or(false)
            || navigator.max_touch_points() > 0;

        Viewport {
            width: width.max(0.0) as u32,
            user_agent: navigator.user_agent().unwrap_or_default(),
            touch,
        }
    }

    fn on_resize(&self, handler: ResizeHandler) -> BridgeResult<()> {
        let mut listeners = self.listeners.borrow_mut();
        for event in ["resize", "orientationchange"] {
            let handler = handler.clone();
            listeners.push(EventListener::new(&self.window, event, move |_| handler())?);
        }
        debug!("viewport listeners installed");
        Ok(())
    }

    fn page_context(&self) -> PageContext {
        PageContext {
            localized_product_id: self.localized_product_id.clone(),
            body_class: self
                .document
                .body()
                .map(|body| body.class_name())
                .unwrap_or_default(),
            add_to_cart_value: self.first_attribute(ADD_TO_CART_SELECTOR, "value"),
            meta_product_id: self.first_attribute(PRODUCT_META_SELECTOR, "content"),
        }
    }
}
