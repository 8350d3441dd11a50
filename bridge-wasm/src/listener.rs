//! Owned DOM event listeners.
//!
//! A `Closure` handed to `addEventListener` must outlive the registration.
//! [`EventListener`] keeps both together and unregisters on drop, so adapters
//! just store listeners next to the element they watch.

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget};

use crate::error::{WasmError, WasmResult};

pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    /// Register `callback` for `event` on `target`.
    pub fn new<F>(target: &EventTarget, event: &'static str, callback: F) -> WasmResult<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(WasmError::from)?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}
