//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A required global (`window`, `document`, a library) is missing
    #[error("Not available: {0}")]
    NotAvailable(String),

    /// An element the bridge created or registered is gone
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The player settings object could not be read
    #[error("Invalid settings: {0}")]
    Settings(String),
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(what) => BridgeError::NotAvailable(what),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_value))
    }
}

/// Best-effort message of a thrown JavaScript value.
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        text
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", value)
    }
}

/// Convert a thrown value into a bridge error with context.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{context}: {}", js_message(&err)))
}

/// Media promise rejections. The browser's autoplay policy rejects with
/// `NotAllowedError`; that one is a refusal, not a failure.
pub(crate) fn media_rejection(context: &str, err: JsValue) -> BridgeError {
    let name = err
        .dyn_ref::<web_sys::DomException>()
        .map(|e| e.name())
        .unwrap_or_default();
    if name == "NotAllowedError" {
        BridgeError::Rejected(format!("{context}: {}", js_message(&err)))
    } else {
        js_error(context, err)
    }
}
