//! Turns metrics snapshots into counter and health-indicator updates.

use crate::core::{MetricsSink, MetricsSnapshot};
use crate::render::{CounterSlot, Indicator, IndicatorColor, RenderSurface};
use std::sync::Arc;
use tracing::debug;

/// Stateless renderer for metrics snapshots.
///
/// Writes the three counters, then colors the health indicators. The total
/// indicator belongs to the general group, so an `error` flag turns it orange
/// along with everything else; independently, a negative raw total forces it
/// orange even when `error` is false. Metrics updates never produce a toast.
pub struct CounterRenderer {
    surface: Arc<dyn RenderSurface>,
}

impl CounterRenderer {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self { surface }
    }
}

impl MetricsSink for CounterRenderer {
    fn render(&self, snapshot: &MetricsSnapshot) {
        self.surface
            .set_counter(CounterSlot::Inbound, &snapshot.inbound.to_string());
        self.surface
            .set_counter(CounterSlot::Outbound, &snapshot.outbound.to_string());
        self.surface
            .set_counter(CounterSlot::Total, &snapshot.display_total().to_string());

        let general = if snapshot.error {
            IndicatorColor::Warning
        } else {
            IndicatorColor::Nominal
        };
        self.surface.set_indicator(Indicator::General, general);

        // Evaluated against the raw total, independent of the error flag.
        let total = if snapshot.total < 0 {
            IndicatorColor::Warning
        } else {
            general
        };
        self.surface.set_indicator(Indicator::Total, total);

        debug!(
            inbound = snapshot.inbound,
            outbound = snapshot.outbound,
            total = snapshot.display_total(),
            error = snapshot.error,
            "counters updated"
        );
    }
}
