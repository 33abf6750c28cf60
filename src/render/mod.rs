//! Rendering: the surface abstraction and the two concrete renderers.
//!
//! The presentation layer (DOM, terminal, whatever hosts the dashboard) is an
//! external collaborator. The core only drives it through the
//! [`RenderSurface`] trait; the renderers here translate decoded frames into
//! surface operations.

pub mod counters;
pub mod logging_surface;
pub mod toast;

pub use counters::CounterRenderer;
pub use logging_surface::LoggingSurface;
pub use toast::ToastRenderer;

use std::time::Duration;

/// Named display slots for the live counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterSlot {
    Inbound,
    Outbound,
    Total,
}

impl CounterSlot {
    /// The slot identifier the presentation layer keys its elements by.
    pub fn slot_id(self) -> &'static str {
        match self {
            Self::Inbound => "count-in",
            Self::Outbound => "count-out",
            Self::Total => "count-total",
        }
    }
}

/// Health indicator groups.
///
/// `General` covers every health indicator on the page, the total-specific one
/// included. `Total` addresses only the indicator next to the total counter,
/// which can additionally be forced to a warning on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    General,
    Total,
}

/// The binary health color scheme. There is no intermediate severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorColor {
    Nominal,
    Warning,
}

impl IndicatorColor {
    /// The CSS color value applied by the original presentation.
    pub fn css_value(self) -> &'static str {
        match self {
            Self::Nominal => "green",
            Self::Warning => "orange",
        }
    }
}

/// The fixed rendering sink the core depends on but does not implement.
///
/// Implementations own the actual visuals: the appended fragment's auto-dismiss
/// timer, the close control wired into transient elements, and any eviction
/// policy for accumulated elements.
pub trait RenderSurface: Send + Sync {
    /// Appends a transient markup fragment and shows it immediately.
    ///
    /// The fragment must be removed once `timeout` elapses; it may also be
    /// dismissed earlier by user action.
    fn append_transient(&self, id: &str, markup: &str, timeout: Duration);

    /// Replaces the text of a named counter slot.
    fn set_counter(&self, slot: CounterSlot, value: &str);

    /// Switches an indicator group to the given color.
    fn set_indicator(&self, indicator: Indicator, color: IndicatorColor);
}
