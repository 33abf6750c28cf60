//! The notification channel: a user-scoped subscription for popup messages.
//!
//! After connecting, the client registers itself by sending the subscriber
//! identity as a single text frame; the server uses it to route messages to
//! this connection. Every inbound frame is decoded as a [`Notification`] and
//! handed to the sink.

use crate::channel::{
    ChannelDriver, ChannelError, ChannelState, ReconnectPolicy, Supervisor, WebSocketConnection,
};
use crate::core::{Notification, NotificationSink, SubscriberIdentity};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Decodes one notification frame.
///
/// # Errors
/// Returns an error if the payload is not a JSON object with the expected
/// `head`/`msg` fields. Callers log and skip the frame; the connection is
/// unaffected.
pub fn decode_notification(text: &str) -> Result<Notification> {
    let note: Notification = serde_json::from_str(text)?;
    Ok(note)
}

/// Client for the notification channel.
pub struct NotifyClient {
    supervisor: Supervisor,
    driver: NotifyDriver,
}

struct NotifyDriver {
    identity: SubscriberIdentity,
    sink: Arc<dyn NotificationSink>,
}

#[async_trait]
impl ChannelDriver for NotifyDriver {
    fn name(&self) -> &'static str {
        "notify"
    }

    async fn on_open(&self, conn: &mut dyn WebSocketConnection) -> Result<(), ChannelError> {
        info!(identity = %self.identity, "registering subscriber");
        conn.send_text(self.identity.as_str())
            .await
            .map_err(ChannelError::Transport)
    }

    fn on_frame(&self, text: &str) {
        match decode_notification(text) {
            Ok(note) => {
                debug!(head = %note.head, ?note.kind, "notification frame");
                self.sink.render(&note);
            }
            Err(e) => {
                warn!(error = %e, "skipping undecodable notification frame");
            }
        }
    }
}

impl NotifyClient {
    /// Creates a client for `url`, registered as `identity`.
    ///
    /// Identity validation happens before this point: constructing a
    /// [`SubscriberIdentity`] is the gate, so a `NotifyClient` always has a
    /// usable identity.
    pub fn new(
        url: String,
        identity: SubscriberIdentity,
        sink: Arc<dyn NotificationSink>,
        allow_invalid_certs: bool,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            supervisor: Supervisor::new(url, allow_invalid_certs, policy),
            driver: NotifyDriver { identity, sink },
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
