//! Browser console logging.
//!
//! `core_runtime::logging::init_logging` installs nothing on `wasm32`; the
//! page entry point calls [`init_console_logging`] instead, which routes
//! `tracing` events to DevTools through `tracing-wasm`.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};

/// Install the panic hook and a console subscriber. Returns `false` when a
/// global subscriber was already set.
pub fn init_console_logging(debug: bool) -> bool {
    console_error_panic_hook::set_once();

    let level = if debug { Level::DEBUG } else { Level::INFO };
    let config = WASMLayerConfigBuilder::new()
        .set_max_level(level)
        .set_report_logs_in_timings(false)
        .build();

    tracing_subscriber::registry()
        .with(WASMLayer::new(config))
        .try_init()
        .is_ok()
}
