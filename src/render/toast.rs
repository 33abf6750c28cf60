//! Turns notification messages into transient toast elements.

use crate::core::{Notification, NotificationSink};
use crate::render::RenderSurface;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Stateless renderer for notification messages.
///
/// Each call builds a uniquely identified toast fragment and hands it to the
/// surface together with its auto-dismiss timeout. Identifiers are derived
/// from the render timestamp; uniqueness only needs to hold within a
/// millisecond, which is plenty for a single subscriber's message rate.
pub struct ToastRenderer {
    surface: Arc<dyn RenderSurface>,
}

impl ToastRenderer {
    pub fn new(surface: Arc<dyn RenderSurface>) -> Self {
        Self { surface }
    }

    fn render_at(&self, note: &Notification, now: DateTime<Utc>) {
        let id = format!("popup-msg-{}", now.timestamp_millis());
        let markup = build_markup(&id, &now.format("%H:%M").to_string(), note);

        self.surface
            .append_transient(&id, &markup, Duration::from_millis(note.timeout_ms));
        debug!(id, head = %note.head, "new popup appended");
    }
}

impl NotificationSink for ToastRenderer {
    fn render(&self, note: &Notification) {
        self.render_at(note, Utc::now());
    }
}

/// Builds the toast fragment.
///
/// `head` and `msg` are interpolated verbatim (the server is trusted); the
/// body keeps `white-space: pre` so embedded line breaks survive. The severity
/// class comes from the closed [`Severity`](crate::core::Severity) mapping,
/// never from raw wire input.
fn build_markup(id: &str, stamp: &str, note: &Notification) -> String {
    let mut toast = format!(
        "<div id=\"{id}\" class=\"toast\" role=\"alert\" data-delay=\"{}\">",
        note.timeout_ms
    );
    toast.push_str("<div class=\"toast-header\">");
    toast.push_str(&format!("<strong class=\"mr-auto\">{}</strong>", note.head));
    toast.push_str(&format!("<small class=\"text-muted\">{stamp}</small>"));
    toast.push_str(
        "<button type=\"button\" class=\"close\" data-dismiss=\"toast\" aria-label=\"Close\">\
         <span aria-hidden=\"true\">&times;</span></button></div>",
    );
    toast.push_str(&format!(
        "<div class=\"{}\" style=\"white-space: pre;\">{}</div></div>",
        note.kind.style_class(),
        note.msg
    ));
    toast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::render::{CounterSlot, Indicator, IndicatorColor};
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Appended {
        id: String,
        markup: String,
        timeout: Duration,
    }

    #[derive(Default)]
    struct RecordingSurface {
        appended: Mutex<Vec<Appended>>,
    }

    impl RenderSurface for RecordingSurface {
        fn append_transient(&self, id: &str, markup: &str, timeout: Duration) {
            self.appended.lock().unwrap().push(Appended {
                id: id.to_string(),
                markup: markup.to_string(),
                timeout,
            });
        }

        fn set_counter(&self, _slot: CounterSlot, _value: &str) {}

        fn set_indicator(&self, _indicator: Indicator, _color: IndicatorColor) {}
    }

    fn note(head: &str, msg: &str, kind: Severity, timeout_ms: u64) -> Notification {
        Notification {
            head: head.to_string(),
            msg: msg.to_string(),
            kind,
            timeout_ms,
        }
    }

    #[test]
    fn renders_head_and_msg_verbatim() {
        let surface = Arc::new(RecordingSurface::default());
        let renderer = ToastRenderer::new(surface.clone());

        renderer.render(&note("Build", "line1\nline2", Severity::Success, 4000));

        let appended = surface.appended.lock().unwrap();
        assert_eq!(appended.len(), 1);
        let toast = &appended[0];
        assert!(toast.markup.contains("<strong class=\"mr-auto\">Build</strong>"));
        // Embedded newline preserved exactly, not collapsed.
        assert!(toast.markup.contains("line1\nline2"));
        assert!(toast.markup.contains("white-space: pre"));
        assert!(toast.markup.contains("alert-success"));
        assert_eq!(toast.timeout, Duration::from_millis(4000));
    }

    #[test]
    fn id_and_timestamp_derive_from_render_time() {
        let surface = Arc::new(RecordingSurface::default());
        let renderer = ToastRenderer::new(surface.clone());
        let when = Utc.with_ymd_and_hms(2024, 5, 4, 9, 5, 0).unwrap();

        renderer.render_at(&note("Hi", "there", Severity::Info, 1000), when);

        let appended = surface.appended.lock().unwrap();
        let toast = &appended[0];
        assert_eq!(toast.id, format!("popup-msg-{}", when.timestamp_millis()));
        assert!(toast.markup.contains(&format!("id=\"{}\"", toast.id)));
        // Human readable hours:minutes, UTC.
        assert!(toast.markup.contains("<small class=\"text-muted\">09:05</small>"));
    }

    #[test]
    fn includes_close_control() {
        let surface = Arc::new(RecordingSurface::default());
        let renderer = ToastRenderer::new(surface.clone());

        renderer.render(&note("a", "b", Severity::Danger, 500));

        let appended = surface.appended.lock().unwrap();
        assert!(appended[0].markup.contains("data-dismiss=\"toast\""));
        assert!(appended[0].markup.contains("alert-danger"));
    }
}
