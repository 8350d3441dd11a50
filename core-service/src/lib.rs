//! Player service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, page, player
//! surface, media engines) into the shared Rust core. Native hosts and tests
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`),
//! whereas WebAssembly builds enable the `wasm` feature and rely on the
//! adapters from `bridge-wasm`.
//!
//! Every service is constructed exactly once in [`PlayerService::new`] and
//! shared by reference afterwards. Clicks on page triggers, signals from the
//! media engines and [`PlayerCommand`]s all funnel into one run loop that
//! calls the controller.

pub mod command;
pub mod error;

pub use command::{PlayerCommand, PlayerHandle};
pub use error::{Result, ServiceError};

use std::sync::Arc;

use bridge_traits::{
    media::{MediaElementFactory, WaveformLibrary},
    page::{PageHost, PlayerSurface, StatusSurface},
};
use core_page::triggers::product_id_from_page;
use core_page::{
    LayoutAdapter, PlayIntent, ScanReport, SurfaceObserver, TriggerBinder, TriggerDirectory,
};
use core_playback::{BackendEvent, PlaybackDeps, PlaybackError, PlayerController};
use core_runtime::config::PlayerConfig;
use core_runtime::events::EventBus;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{future, stream, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
use bridge_wasm::{build_wasm_bridges, WasmBridgeSet};

/// Aggregated handle to all bridge dependencies the player requires.
pub struct PlayerDependencies {
    pub config: PlayerConfig,
    pub page: Arc<dyn PageHost>,
    pub surface: Arc<dyn PlayerSurface>,
    pub status: Option<Arc<dyn StatusSurface>>,
    /// `None` when the host cannot load the waveform library at all; the
    /// player then starts on the plain backend.
    pub waveform_library: Option<Arc<dyn WaveformLibrary>>,
    pub media_factory: Arc<dyn MediaElementFactory>,
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
impl PlayerDependencies {
    /// Bundle browser bridges with a validated configuration.
    pub fn from_wasm(set: WasmBridgeSet, config: PlayerConfig) -> Self {
        Self {
            config,
            page: set.page,
            surface: set.surface,
            status: Some(set.status),
            waveform_library: Some(set.waveform_library),
            media_factory: set.media_factory,
        }
    }
}

enum Input {
    Intent(PlayIntent),
    Backend(BackendEvent),
    Command(PlayerCommand),
}

struct Inputs {
    intents: UnboundedReceiver<PlayIntent>,
    backend: UnboundedReceiver<BackendEvent>,
    commands: UnboundedReceiver<PlayerCommand>,
}

/// Primary façade exposed to host applications.
pub struct PlayerService {
    controller: Arc<PlayerController>,
    binder: TriggerBinder,
    layout: Arc<LayoutAdapter>,
    page: Arc<dyn PageHost>,
    surface: Arc<dyn PlayerSurface>,
    commands: UnboundedSender<PlayerCommand>,
    inputs: Mutex<Option<Inputs>>,
}

impl PlayerService {
    /// Construct the controller and the page services and wire them together.
    pub fn new(deps: PlayerDependencies) -> Result<Self> {
        let PlayerDependencies {
            config,
            page,
            surface,
            status,
            waveform_library,
            media_factory,
        } = deps;

        let events = EventBus::new(config.event_buffer);
        let controller = Arc::new(PlayerController::new(
            &config,
            PlaybackDeps {
                waveform_library,
                media_factory,
            },
            events,
        ));
        let backend = controller.take_backend_events().ok_or_else(|| {
            ServiceError::InitializationFailed("backend events already taken".to_string())
        })?;

        let layout = Arc::new(LayoutAdapter::new(
            Arc::clone(&page),
            Arc::clone(&surface),
            config.compact_breakpoint_px,
        ));

        // The surface renders before the layout is re-applied to it.
        controller.add_observer(Arc::new(SurfaceObserver::new(Arc::clone(&surface))));
        controller.add_observer(layout.clone());
        controller.set_layout_source(layout.clone());
        controller.set_navigator(Arc::new(TriggerDirectory::new(Arc::clone(&page))));
        if let Some(status) = status {
            controller.set_status_surface(status);
        }

        let (binder, intents) = TriggerBinder::new(Arc::clone(&page));
        let (commands, command_rx) = mpsc::unbounded();

        info!(
            compact = layout.profile().is_compact(),
            "Player service initialized"
        );

        Ok(Self {
            controller,
            binder,
            layout,
            page,
            surface,
            commands,
            inputs: Mutex::new(Some(Inputs {
                intents,
                backend,
                commands: command_rx,
            })),
        })
    }

    pub fn controller(&self) -> Arc<PlayerController> {
        Arc::clone(&self.controller)
    }

    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle::new(self.commands.clone())
    }

    pub fn events(&self) -> &EventBus {
        self.controller.events()
    }

    /// Bind the page's triggers and the player's controls, then load the
    /// page's own product, if any, without starting playback.
    pub async fn start(&self) -> Result<ScanReport> {
        let report = self.binder.scan()?;

        let controls = self.handle();
        self.surface.bind_controls(Arc::new(move |action| {
            if let Err(e) = controls.send(action.into()) {
                debug!(error = %e, "Control used after shutdown");
            }
        }));

        let resize = self.handle();
        let watched = self.page.on_resize(Arc::new(move || {
            resize.send(PlayerCommand::ViewportChanged).ok();
        }));
        if let Err(e) = watched {
            warn!(error = %e, "Viewport changes will not update the layout");
        }
        self.layout.apply();

        match product_id_from_page(self.page.as_ref()) {
            Some(product_id) => {
                info!(product_id = %product_id, "Initial product load");
                if let Err(e) = self.controller.load_product(product_id.as_str(), false).await {
                    warn!(error = %e, "Initial product load failed");
                }
            }
            None => debug!("No product on this page"),
        }
        Ok(report)
    }

    /// Process trigger clicks, media signals and commands until
    /// [`PlayerCommand::Shutdown`].
    ///
    /// Inputs are handled concurrently so a pending settle or autoplay delay
    /// never blocks a click. The controller orders them with its load tickets.
    pub async fn run(&self) -> Result<()> {
        let inputs = self.inputs.lock().take().ok_or(ServiceError::AlreadyRunning)?;

        let merged = stream::select(
            inputs.intents.map(Input::Intent),
            stream::select(
                inputs.backend.map(Input::Backend),
                inputs.commands.map(Input::Command),
            ),
        );

        info!("Player service running");
        merged
            .take_while(|input| {
                future::ready(!matches!(input, Input::Command(PlayerCommand::Shutdown)))
            })
            .for_each_concurrent(None, |input| self.dispatch(input))
            .await;

        self.controller.shutdown();
        info!("Player service stopped");
        Ok(())
    }

    async fn dispatch(&self, input: Input) {
        match input {
            Input::Intent(intent) => self.handle_intent(intent).await,
            Input::Backend(event) => self.controller.handle_backend_event(event).await,
            Input::Command(command) => self.execute(command).await,
        }
    }

    /// Load what a clicked trigger asks for. A track link for the product
    /// already loaded switches tracks without fetching again.
    pub async fn handle_intent(&self, intent: PlayIntent) {
        let Some(request) = self.binder.resolve(&intent) else {
            self.controller.status().report(&PlaybackError::InvalidInput(
                "trigger has no product id".to_string(),
            ));
            return;
        };

        let current = self.controller.session().read().product_id();
        let outcome = match request.track_index {
            Some(index) if current.as_deref() == Some(request.product_id.as_str()) => {
                debug!(index, "Track link for the loaded product");
                self.controller.select_track(index).await
            }
            track_index => {
                self.controller
                    .load_product_at(request.product_id.as_str(), track_index, true)
                    .await
            }
        };

        if let Err(e) = outcome {
            debug!(error = %e, "Trigger load did not complete");
        }
    }

    /// Execute one command. Failures are already on the status line.
    pub async fn execute(&self, command: PlayerCommand) {
        let controller = &self.controller;
        let outcome = match command {
            PlayerCommand::Play => controller.play().await,
            PlayerCommand::Pause => controller.pause().await,
            PlayerCommand::TogglePlayPause => controller.toggle_play_pause().await,
            PlayerCommand::Next => controller.next().await,
            PlayerCommand::Previous => controller.previous().await,
            PlayerCommand::SelectTrack(index) => controller.select_track(index).await,
            PlayerCommand::Seek(fraction) => controller.seek(fraction),
            PlayerCommand::SeekClick { offset_x, width } => controller.seek_click(offset_x, width),
            PlayerCommand::SetVolume(percent) => {
                controller.set_volume(percent);
                Ok(())
            }
            PlayerCommand::SetPitch(step) => {
                controller.set_pitch(step);
                Ok(())
            }
            PlayerCommand::AdjustPitch(delta) => {
                controller.adjust_pitch(delta);
                Ok(())
            }
            PlayerCommand::AddToCart => controller.add_to_cart().await.map(|_| ()),
            PlayerCommand::Load {
                product_id,
                track_index,
                autoplay,
            } => {
                controller
                    .load_product_at(&product_id, track_index, autoplay)
                    .await
            }
            PlayerCommand::Rescan => {
                if let Err(e) = self.binder.scan() {
                    warn!(error = %e, "Trigger rescan failed");
                }
                Ok(())
            }
            PlayerCommand::ViewportChanged => {
                self.layout.refresh();
                Ok(())
            }
            PlayerCommand::Shutdown => Ok(()),
        };

        if let Err(e) = outcome {
            debug!(error = %e, "Command did not complete");
        }
    }
}

/// Convenience bootstrapper for WebAssembly hosts.
///
/// ```ignore
/// # async fn example(settings: core_service::WasmBridgeConfig) -> core_service::Result<()> {
/// use core_service::bootstrap_wasm;
///
/// let player = bootstrap_wasm(settings).await?;
/// player.start().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(config: WasmBridgeConfig) -> Result<PlayerService> {
    let bridges = build_wasm_bridges(&config)
        .map_err(|err| ServiceError::InitializationFailed(err.to_string()))?;

    let mut builder = PlayerConfig::builder()
        .ajax_url(config.ajax_url.clone())
        .nonce(config.nonce.clone())
        .waveform_container(config.waveform_container.clone())
        .http_client(Arc::clone(&bridges.http_client));
    if let Some(cart_url) = &config.cart_url {
        builder = builder.cart_url(cart_url.clone());
    }
    let player_config = builder.build()?;

    PlayerService::new(PlayerDependencies::from_wasm(bridges, player_config))
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod wasm_entry {
    use super::*;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    /// Script-side handle returned by `startVinylPlayer`.
    #[wasm_bindgen]
    pub struct VinylPlayer {
        handle: PlayerHandle,
    }

    #[wasm_bindgen]
    impl VinylPlayer {
        fn send(&self, command: PlayerCommand) {
            if let Err(e) = self.handle.send(command) {
                tracing::debug!(error = %e, "Player command after shutdown");
            }
        }

        /// Bind triggers inserted after startup.
        pub fn rescan(&self) {
            self.send(PlayerCommand::Rescan);
        }

        #[wasm_bindgen(js_name = loadProduct)]
        pub fn load_product(&self, product_id: String, autoplay: bool) {
            self.send(PlayerCommand::Load {
                product_id,
                track_index: None,
                autoplay,
            });
        }

        pub fn play(&self) {
            self.send(PlayerCommand::Play);
        }

        pub fn pause(&self) {
            self.send(PlayerCommand::Pause);
        }

        pub fn next(&self) {
            self.send(PlayerCommand::Next);
        }

        pub fn previous(&self) {
            self.send(PlayerCommand::Previous);
        }

        pub fn destroy(&self) {
            self.send(PlayerCommand::Shutdown);
        }
    }

    /// Page entry point: `startVinylPlayer(window.yoyakuPlayerSettings)`.
    ///
    /// Resolves once triggers are bound and the page's product is loaded; the
    /// run loop keeps going on the event loop.
    #[wasm_bindgen(js_name = startVinylPlayer)]
    pub async fn start_vinyl_player(settings: JsValue) -> std::result::Result<VinylPlayer, JsValue> {
        let config = WasmBridgeConfig::from_js(settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        bridge_wasm::init_console_logging(config.debug);
        let player = Rc::new(
            bootstrap_wasm(config)
                .await
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
        );

        let runner = Rc::clone(&player);
        core_async::task::spawn(async move {
            if let Err(e) = runner.run().await {
                tracing::error!(error = %e, "Player run loop ended with an error");
            }
        });

        player
            .start()
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(VinylPlayer {
            handle: player.handle(),
        })
    }
}
