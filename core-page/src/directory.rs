use std::sync::Arc;

use bridge_traits::page::PageHost;
use core_catalog::ProductId;
use core_playback::ProductNavigator;
use tracing::{debug, warn};

use crate::triggers::{product_id_from_element, PRODUCT_ORDER_SELECTOR};

/// Product order as the page lists its product buttons.
///
/// Queried on every call so products inserted after startup take part in
/// auto-advance.
pub struct TriggerDirectory {
    host: Arc<dyn PageHost>,
}

impl TriggerDirectory {
    pub fn new(host: Arc<dyn PageHost>) -> Self {
        Self { host }
    }

    /// Distinct product ids in document order.
    pub fn products(&self) -> Vec<ProductId> {
        let elements = match self.host.query(PRODUCT_ORDER_SELECTOR) {
            Ok(elements) => elements,
            Err(e) => {
                warn!(error = %e, "Product discovery failed");
                return Vec::new();
            }
        };

        let mut products: Vec<ProductId> = Vec::with_capacity(elements.len());
        for id in elements.iter().filter_map(product_id_from_element) {
            if !products.contains(&id) {
                products.push(id);
            }
        }
        products
    }
}

impl ProductNavigator for TriggerDirectory {
    fn next_product_after(&self, current: &ProductId) -> Option<ProductId> {
        let products = self.products();
        let next = products
            .iter()
            .position(|id| id == current)
            .and_then(|pos| products.get(pos + 1))
            .or_else(|| products.first())
            .cloned();

        debug!(current = %current, next = ?next, candidates = products.len(), "Next product");
        next
    }
}
