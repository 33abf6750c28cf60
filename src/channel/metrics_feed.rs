//! The metrics channel: an unscoped broadcast subscription for live counters.
//!
//! No registration handshake is sent; the server pushes the same snapshots to
//! every connection. Each inbound frame is a complete [`MetricsSnapshot`]
//! replacing whatever was displayed before.

use crate::channel::{ChannelDriver, ChannelError, ChannelState, ReconnectPolicy, Supervisor, WebSocketConnection};
use crate::core::{MetricsSink, MetricsSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Decodes one metrics frame.
///
/// # Errors
/// Returns an error if the payload is not a JSON object with the expected
/// `in`/`out`/`tot`/`error` fields. Callers log and skip the frame.
pub fn decode_snapshot(text: &str) -> Result<MetricsSnapshot> {
    let snapshot: MetricsSnapshot = serde_json::from_str(text)?;
    Ok(snapshot)
}

/// Client for the metrics channel.
pub struct MetricsClient {
    supervisor: Supervisor,
    driver: MetricsDriver,
}

struct MetricsDriver {
    sink: Arc<dyn MetricsSink>,
}

#[async_trait]
impl ChannelDriver for MetricsDriver {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn on_frame(&self, text: &str) {
        match decode_snapshot(text) {
            Ok(snapshot) => {
                debug!(?snapshot, "metrics frame");
                self.sink.render(&snapshot);
            }
            Err(e) => {
                warn!(error = %e, "skipping undecodable metrics frame");
            }
        }
    }
}

impl MetricsClient {
    pub fn new(
        url: String,
        sink: Arc<dyn MetricsSink>,
        allow_invalid_certs: bool,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(url, allow_invalid_certs, policy),
            driver: MetricsDriver { sink },
        }
    }

    /// Observes lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.supervisor.state()
    }

    /// Connects and processes frames until the policy says to stop.
    ///
    /// # Errors
    /// Returns an error if the initial connection cannot be established under
    /// [`ReconnectPolicy::Never`].
    pub async fn run(&self) -> Result<(), ChannelError> {
        self.supervisor.run(&self.driver).await
    }

    /// Runs against a pre-established connection (primarily for testing).
    pub async fn run_with_connection(&self, connection: Box<dyn WebSocketConnection>) {
        self.supervisor
            .run_with_connection(connection, &self.driver)
            .await;
    }
}
