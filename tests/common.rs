//! Shared helpers for the channel integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use dashlink::channel::WebSocketConnection;
use dashlink::core::{MetricsSink, MetricsSnapshot, Notification, NotificationSink};
use dashlink::render::{CounterSlot, Indicator, IndicatorColor, RenderSurface};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Fake WebSocket implementation for driving channels without a server.
///
/// Plays back a script of inbound frames and records outbound text frames.
pub struct FakeWebSocket {
    script: VecDeque<Result<String, WsError>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl FakeWebSocket {
    /// Creates a fake connection delivering the given text frames in order,
    /// then behaving as closed.
    pub fn with_text_frames(frames: Vec<&str>) -> Self {
        Self {
            script: frames.into_iter().map(|f| Ok(f.to_string())).collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a fake connection that fails with a transport error after the
    /// given frames.
    pub fn with_frames_then_error(frames: Vec<&str>) -> Self {
        let mut script: VecDeque<Result<String, WsError>> =
            frames.into_iter().map(|f| Ok(f.to_string())).collect();
        script.push_back(Err(WsError::ConnectionClosed));
        Self {
            script,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto everything sent through this connection.
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl WebSocketConnection for FakeWebSocket {
    async fn read_message(&mut self) -> Option<Result<Message, WsError>> {
        match self.script.pop_front()? {
            Ok(text) => Some(Ok(Message::text(text))),
            Err(e) => Some(Err(e)),
        }
    }

    async fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// One recorded toast append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedToast {
    pub id: String,
    pub markup: String,
    pub timeout: Duration,
}

/// A surface that records every operation for later assertions.
#[derive(Default)]
pub struct RecordingSurface {
    pub toasts: Mutex<Vec<AppendedToast>>,
    pub counters: Mutex<Vec<(CounterSlot, String)>>,
    pub indicators: Mutex<Vec<(Indicator, IndicatorColor)>>,
}

impl RecordingSurface {
    pub fn last_counter(&self, slot: CounterSlot) -> Option<String> {
        self.counters
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, v)| v.clone())
    }

    pub fn last_indicator(&self, indicator: Indicator) -> Option<IndicatorColor> {
        self.indicators
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(i, _)| *i == indicator)
            .map(|(_, c)| *c)
    }
}

impl RenderSurface for RecordingSurface {
    fn append_transient(&self, id: &str, markup: &str, timeout: Duration) {
        self.toasts.lock().unwrap().push(AppendedToast {
            id: id.to_string(),
            markup: markup.to_string(),
            timeout,
        });
    }

    fn set_counter(&self, slot: CounterSlot, value: &str) {
        self.counters.lock().unwrap().push((slot, value.to_string()));
    }

    fn set_indicator(&self, indicator: Indicator, color: IndicatorColor) {
        self.indicators.lock().unwrap().push((indicator, color));
    }
}

/// A sink that records decoded notifications.
#[derive(Default)]
pub struct RecordingNotificationSink {
    pub rendered: Mutex<Vec<Notification>>,
}

impl NotificationSink for RecordingNotificationSink {
    fn render(&self, note: &Notification) {
        self.rendered.lock().unwrap().push(note.clone());
    }
}

/// A sink that records decoded snapshots.
#[derive(Default)]
pub struct RecordingMetricsSink {
    pub rendered: Mutex<Vec<MetricsSnapshot>>,
}

impl MetricsSink for RecordingMetricsSink {
    fn render(&self, snapshot: &MetricsSnapshot) {
        self.rendered.lock().unwrap().push(*snapshot);
    }
}
