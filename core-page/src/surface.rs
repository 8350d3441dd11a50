use std::sync::Arc;

use bridge_traits::page::{PlayerSurface, ProductView, TrackView};
use core_catalog::{Product, Track};
use core_playback::progress::{progress_fraction, progress_label};
use core_playback::{PlayerObserver, PlayerState};
use tracing::warn;

/// Mirrors controller callbacks onto the singleton player element.
pub struct SurfaceObserver {
    surface: Arc<dyn PlayerSurface>,
}

impl SurfaceObserver {
    pub fn new(surface: Arc<dyn PlayerSurface>) -> Self {
        Self { surface }
    }
}

/// Display data for `product`.
pub fn product_view(product: &Product, tracks: &[Track]) -> ProductView {
    ProductView {
        product_id: product.id.to_string(),
        title: product.title.clone(),
        artist: product.artist.clone(),
        label: product.label.clone(),
        cover: product.cover.clone(),
        sku: product.sku.clone(),
        tracks: tracks
            .iter()
            .map(|track| TrackView {
                name: track.name.clone(),
                bpm: track.bpm,
                duration: track.duration.clone(),
            })
            .collect(),
    }
}

impl PlayerObserver for SurfaceObserver {
    fn on_rendered(&self, product: &Product, tracks: &[Track]) {
        if let Err(e) = self.surface.mount() {
            warn!(error = %e, "Failed to attach player element");
            return;
        }
        if let Err(e) = self.surface.render_product(&product_view(product, tracks)) {
            warn!(product_id = %product.id, error = %e, "Failed to render product");
        }
    }

    fn on_track_changed(&self, index: usize, track: &Track) {
        self.surface.highlight_track(index, &track.name);
    }

    fn on_state_changed(&self, _state: PlayerState, playing: bool) {
        self.surface.set_playing(playing);
    }

    fn on_progress(&self, position: f64, duration: Option<f64>) {
        self.surface.set_progress(
            progress_fraction(position, duration),
            &progress_label(position, duration),
        );
    }
}
