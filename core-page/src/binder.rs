//! Click interception for play triggers.
//!
//! The binder never touches the controller. Each intercepted click becomes a
//! [`PlayIntent`] on a channel; the service turns intents into loads. This
//! keeps host callbacks free of async work and of references back into the
//! page host.

use std::collections::HashSet;
use std::sync::Arc;

use bridge_traits::page::{ElementId, PageHost};
use core_catalog::ProductId;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::triggers::{
    product_id_from_page, selector_list, TriggerTarget, LEGACY_PLAYER_SELECTORS,
    PLAY_TRIGGER_SELECTORS,
};

/// A click on a bound trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayIntent {
    pub source: ElementId,
    pub target: TriggerTarget,
}

/// A click resolved against the page: what to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub product_id: ProductId,
    pub track_index: Option<usize>,
}

/// Outcome of one [`TriggerBinder::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub found: usize,
    pub newly_bound: usize,
    pub hidden_players: usize,
}

pub struct TriggerBinder {
    host: Arc<dyn PageHost>,
    intents: UnboundedSender<PlayIntent>,
    bound: Mutex<HashSet<ElementId>>,
}

impl TriggerBinder {
    /// Create a binder and the receiving end of its intent channel.
    pub fn new(host: Arc<dyn PageHost>) -> (Self, UnboundedReceiver<PlayIntent>) {
        let (intents, rx) = mpsc::unbounded();
        let binder = Self {
            host,
            intents,
            bound: Mutex::new(HashSet::new()),
        };
        (binder, rx)
    }

    /// Discover triggers, bind the ones not seen before and hide competing
    /// players. Safe to call again after the page inserted content.
    pub fn scan(&self) -> Result<ScanReport> {
        let hidden_players = self.hide_legacy_players();
        let elements = self.host.query(&selector_list(&PLAY_TRIGGER_SELECTORS))?;

        let mut report = ScanReport {
            found: elements.len(),
            hidden_players,
            ..ScanReport::default()
        };

        for element in elements {
            if self.bound.lock().contains(&element.id) {
                continue;
            }

            let intent = PlayIntent {
                source: element.id,
                target: TriggerTarget::from_element(&element),
            };
            let sender = self.intents.clone();
            let handler = Arc::new(move || {
                if sender.unbounded_send(intent.clone()).is_err() {
                    debug!(element = intent.source.0, "Click after the player shut down");
                }
            });

            match self.host.bind_click(element.id, handler) {
                Ok(()) => {
                    self.bound.lock().insert(element.id);
                    report.newly_bound += 1;
                }
                Err(e) => warn!(element = element.id.0, error = %e, "Failed to bind play trigger"),
            }
        }

        info!(
            found = report.found,
            newly_bound = report.newly_bound,
            hidden = report.hidden_players,
            "Trigger scan complete"
        );
        Ok(report)
    }

    /// Hide players injected by older plugins. Failures only log.
    pub fn hide_legacy_players(&self) -> usize {
        match self.host.hide(&selector_list(&LEGACY_PLAYER_SELECTORS)) {
            Ok(count) => {
                if count > 0 {
                    debug!(count, "Hid legacy players");
                }
                count
            }
            Err(e) => {
                warn!(error = %e, "Failed to hide legacy players");
                0
            }
        }
    }

    /// Product and track for a click. Triggers without an id of their own
    /// fall back to the page's product; `None` when the page has none either.
    pub fn resolve(&self, intent: &PlayIntent) -> Option<PlayRequest> {
        let product_id = intent
            .target
            .product_id
            .clone()
            .or_else(|| product_id_from_page(self.host.as_ref()));

        match product_id {
            Some(product_id) => Some(PlayRequest {
                product_id,
                track_index: intent.target.track_index,
            }),
            None => {
                warn!(element = intent.source.0, "No product id for trigger");
                None
            }
        }
    }

    pub fn bound_count(&self) -> usize {
        self.bound.lock().len()
    }
}
