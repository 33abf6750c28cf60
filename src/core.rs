//! Core domain types and sink traits for Dashlink
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

/// Default show-time for a notification when the frame omits `timeout`.
pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 3000;

/// Minimum length for a subscriber identity to be considered valid.
pub const MIN_IDENTITY_LEN: usize = 3;

/// Severity of a notification message.
///
/// The wire carries this as a lowercase string. Unknown values are mapped to
/// `Info` instead of being carried through verbatim, so a bad `kind` can never
/// leak into a style selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Danger,
}

impl Severity {
    /// Maps a raw wire value onto the closed severity set.
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "success" => Self::Success,
            "info" => Self::Info,
            "warning" => Self::Warning,
            "danger" => Self::Danger,
            other => {
                warn!(kind = other, "unknown severity kind, defaulting to info");
                Self::Info
            }
        }
    }

    /// The style class the presentation layer attaches to the message body.
    pub fn style_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Info => "alert-info",
            Self::Warning => "alert-warning",
            Self::Danger => "alert-danger",
        }
    }

    pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_NOTIFICATION_TIMEOUT_MS
}

/// A user-directed notification message, as delivered on the notification
/// channel.
///
/// `msg` may contain embedded line breaks; they are preserved verbatim all the
/// way into the rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notification {
    /// Title text.
    pub head: String,
    /// Body text, whitespace preserved exactly as sent.
    pub msg: String,
    /// Severity, selecting the visual style.
    #[serde(default, deserialize_with = "Severity::deserialize_lenient")]
    pub kind: Severity,
    /// Show-time in milliseconds before the rendered element dismisses itself.
    #[serde(rename = "timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// The complete counter state conveyed by one metrics frame.
///
/// Each snapshot fully replaces the previous one; there are no deltas and no
/// history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Entries counted so far.
    #[serde(rename = "in")]
    pub inbound: i64,
    /// Exits counted so far.
    #[serde(rename = "out")]
    pub outbound: i64,
    /// Current occupancy. May be negative on the wire.
    #[serde(rename = "tot")]
    pub total: i64,
    /// True when some upstream counting unit is unhealthy.
    pub error: bool,
}

impl MetricsSnapshot {
    /// The total as shown on screen: negative raw values clamp to zero.
    /// The snapshot itself is never mutated.
    pub fn display_total(&self) -> i64 {
        self.total.max(0)
    }
}

/// An opaque string naming the current user, supplied once at startup.
///
/// Construction fails for strings shorter than three characters; an invalid
/// identity suppresses notification channel setup entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberIdentity(String);

impl SubscriberIdentity {
    /// Validates and wraps a raw identity string.
    ///
    /// # Errors
    /// Returns [`IdentityError::TooShort`] if the string has fewer than
    /// [`MIN_IDENTITY_LEN`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = raw.into();
        if raw.chars().count() < MIN_IDENTITY_LEN {
            return Err(IdentityError::TooShort(raw));
        }
        Ok(Self(raw))
    }

    /// The raw identity string, as sent in the subscription handshake.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors produced while validating a subscriber identity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity string is shorter than the minimum length.
    #[error("subscriber identity {0:?} is too short (minimum {MIN_IDENTITY_LEN} characters)")]
    TooShort(String),
}

// =============================================================================
// Sink Traits
// =============================================================================

/// Consumes decoded notification messages.
///
/// Invoked synchronously from within the channel's message-event task; a call
/// must not block.
pub trait NotificationSink: Send + Sync {
    /// Renders one notification.
    fn render(&self, note: &Notification);
}

/// Consumes decoded metrics snapshots.
///
/// Each call fully replaces whatever the previous snapshot displayed.
pub trait MetricsSink: Send + Sync {
    /// Renders one snapshot.
    fn render(&self, snapshot: &MetricsSnapshot);
}
