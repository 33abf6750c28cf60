//! A surface that logs every rendering operation to the console.
//!
//! This serves as a basic implementation to validate the delivery pipeline
//! and can be used for debugging purposes.

use crate::render::{CounterSlot, Indicator, IndicatorColor, RenderSurface};
use std::time::Duration;
use tracing::{debug, info};

/// Console-backed [`RenderSurface`].
///
/// Transient elements have no real auto-dismiss here; the fragment is logged
/// once and forgotten.
#[derive(Debug, Default)]
pub struct LoggingSurface;

impl LoggingSurface {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSurface for LoggingSurface {
    fn append_transient(&self, id: &str, markup: &str, timeout: Duration) {
        info!(id, timeout_ms = timeout.as_millis() as u64, "toast shown");
        debug!(markup, "toast fragment");
    }

    fn set_counter(&self, slot: CounterSlot, value: &str) {
        info!(slot = slot.slot_id(), value, "counter updated");
    }

    fn set_indicator(&self, indicator: Indicator, color: IndicatorColor) {
        info!(?indicator, color = color.css_value(), "indicator updated");
    }
}
