//! Device detection and the compact layout switch.

use std::sync::Arc;

use bridge_traits::page::{PageHost, PlayerSurface, Viewport};
use core_catalog::{Product, Track};
use core_playback::{LayoutSource, PlayerObserver};
use parking_lot::RwLock;
use tracing::debug;

const HANDHELD_AGENTS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Normal,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceProfile {
    pub mode: LayoutMode,
    /// iPhone and iPod need their own control layout.
    pub iphone: bool,
}

impl DeviceProfile {
    /// Compact when the viewport is at most `breakpoint` wide, the user agent
    /// is a handheld, or the device has touch input.
    pub fn detect(viewport: &Viewport, breakpoint: u32) -> Self {
        let agent = viewport.user_agent.to_lowercase();
        let handheld = HANDHELD_AGENTS.iter().any(|needle| agent.contains(needle));
        let narrow = viewport.width > 0 && viewport.width <= breakpoint;

        let mode = if narrow || handheld || viewport.touch {
            LayoutMode::Compact
        } else {
            LayoutMode::Normal
        };

        Self {
            mode,
            iphone: agent.contains("iphone") || agent.contains("ipod"),
        }
    }

    pub fn is_compact(&self) -> bool {
        self.mode == LayoutMode::Compact
    }
}

/// Keeps the player surface in the layout the device calls for.
pub struct LayoutAdapter {
    host: Arc<dyn PageHost>,
    surface: Arc<dyn PlayerSurface>,
    breakpoint: u32,
    profile: RwLock<DeviceProfile>,
}

impl LayoutAdapter {
    pub fn new(host: Arc<dyn PageHost>, surface: Arc<dyn PlayerSurface>, breakpoint: u32) -> Self {
        let profile = DeviceProfile::detect(&host.viewport(), breakpoint);
        Self {
            host,
            surface,
            breakpoint,
            profile: RwLock::new(profile),
        }
    }

    pub fn profile(&self) -> DeviceProfile {
        *self.profile.read()
    }

    /// Re-detect after a resize or orientation change. Returns whether the
    /// profile changed; the surface is only touched on change.
    pub fn refresh(&self) -> bool {
        let detected = DeviceProfile::detect(&self.host.viewport(), self.breakpoint);
        let changed = {
            let mut profile = self.profile.write();
            let changed = *profile != detected;
            *profile = detected;
            changed
        };

        if changed {
            debug!(mode = ?detected.mode, iphone = detected.iphone, "Layout changed");
            self.apply();
        }
        changed
    }

    pub fn apply(&self) {
        let profile = self.profile();
        self.surface.set_layout(profile.is_compact(), profile.iphone);
    }
}

impl LayoutSource for LayoutAdapter {
    fn is_compact(&self) -> bool {
        self.profile().is_compact()
    }
}

impl PlayerObserver for LayoutAdapter {
    fn on_rendered(&self, _product: &Product, _tracks: &[Track]) {
        self.apply();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: u32, agent: &str, touch: bool) -> Viewport {
        Viewport {
            width,
            user_agent: agent.to_string(),
            touch,
        }
    }

    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/128.0";

    #[test]
    fn desktop_is_normal() {
        let profile = DeviceProfile::detect(&viewport(1280, DESKTOP, false), 768);
        assert_eq!(profile.mode, LayoutMode::Normal);
        assert!(!profile.iphone);
    }

    #[test]
    fn narrow_touch_or_handheld_is_compact() {
        assert!(DeviceProfile::detect(&viewport(768, DESKTOP, false), 768).is_compact());
        assert!(DeviceProfile::detect(&viewport(1280, DESKTOP, true), 768).is_compact());

        let ipad = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)";
        let profile = DeviceProfile::detect(&viewport(1024, ipad, false), 768);
        assert!(profile.is_compact());
        assert!(!profile.iphone);
    }

    #[test]
    fn iphone_flag() {
        let agent = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X)";
        let profile = DeviceProfile::detect(&viewport(390, agent, true), 768);
        assert!(profile.is_compact());
        assert!(profile.iphone);
    }
}
