//! Connection supervision shared by both subscription channels.
//!
//! A channel is one long-lived, server-to-client WebSocket subscription. This
//! module owns the pieces common to both of them: the lifecycle state machine,
//! the reconnect policy, TLS connection setup, and the frame-dispatch loop.
//! The channel-specific behavior (handshake, frame decoding) lives in
//! [`notify`] and [`metrics_feed`] as drivers plugged into the supervisor.

pub mod metrics_feed;
pub mod notify;

pub use metrics_feed::MetricsClient;
pub use notify::NotifyClient;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

/// Lifecycle of one channel connection.
///
/// `Closed` is terminal under [`ReconnectPolicy::Never`]; with a backoff
/// policy the channel cycles back through `Reconnecting` and `Connecting`
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Uninitialized,
    Connecting,
    Open,
    Reconnecting,
    Closed,
}

/// What to do when a channel connection closes or fails to establish.
#[derive(Debug, Clone)]
pub enum ReconnectPolicy {
    /// Give up: the channel stays `Closed` until the process restarts.
    /// This mirrors the original page-lifetime behavior.
    Never,
    /// Retry with exponential backoff, doubling from `initial` up to `max`.
    Backoff { initial: Duration, max: Duration },
}

/// Errors surfaced by channel supervision.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },
    #[error("websocket transport error: {0}")]
    Transport(#[from] WsError),
}

/// Builds a channel URL from the dashboard host and a fixed port.
pub fn channel_url(host: &str, port: u16) -> String {
    format!("wss://{host}:{port}/")
}

/// Trait for WebSocket connections, so tests can drive channels with fake
/// transports.
#[async_trait]
pub trait WebSocketConnection: Send {
    /// Reads the next message. `None` means the connection is gone.
    async fn read_message(&mut self) -> Option<Result<Message, WsError>>;

    /// Sends a single text frame.
    async fn send_text(&mut self, text: &str) -> Result<(), WsError>;
}

/// The real transport over tokio-tungstenite.
pub struct TungsteniteConnection {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl WebSocketConnection for TungsteniteConnection {
    async fn read_message(&mut self) -> Option<Result<Message, WsError>> {
        self.inner.next().await
    }

    async fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        self.inner.send(Message::text(text)).await
    }
}

/// Channel-specific behavior plugged into the [`Supervisor`].
#[async_trait]
pub(crate) trait ChannelDriver: Send + Sync {
    /// Short channel name for logs.
    fn name(&self) -> &'static str;

    /// Runs once per established connection, before any frame is read.
    /// The default is no handshake at all.
    async fn on_open(&self, _conn: &mut dyn WebSocketConnection) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Handles one inbound text frame. Runs synchronously in the read loop.
    fn on_frame(&self, text: &str);
}

/// Governs connect/identify/teardown sequencing for one channel.
pub(crate) struct Supervisor {
    url: String,
    allow_invalid_certs: bool,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ChannelState>,
}

impl Supervisor {
    pub(crate) fn new(url: String, allow_invalid_certs: bool, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(ChannelState::Uninitialized);
        Self {
            url,
            allow_invalid_certs,
            policy,
            state_tx,
        }
    }

    /// A watch handle observing lifecycle transitions.
    pub(crate) fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ChannelState) {
        // send_replace never fails; it is fine if nobody is watching.
        self.state_tx.send_replace(state);
    }

    async fn connect(&self) -> Result<TungsteniteConnection, ChannelError> {
        let connector = if self.allow_invalid_certs {
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(|e| ChannelError::Connect {
                    url: self.url.clone(),
                    source: WsError::Tls(e.into()),
                })?;
            Some(Connector::NativeTls(tls))
        } else {
            None
        };

        let (stream, _) = connect_async_tls_with_config(self.url.as_str(), None, false, connector)
            .await
            .map_err(|source| ChannelError::Connect {
                url: self.url.clone(),
                source,
            })?;
        info!(url = %self.url, "connected");
        Ok(TungsteniteConnection { inner: stream })
    }

    /// Runs the channel against an already-established connection, then marks
    /// it `Closed`. Used by tests and by [`Self::run`] under
    /// [`ReconnectPolicy::Never`].
    pub(crate) async fn run_with_connection<D: ChannelDriver>(
        &self,
        connection: Box<dyn WebSocketConnection>,
        driver: &D,
    ) {
        self.session(connection, driver).await;
        self.set_state(ChannelState::Closed);
        info!(channel = driver.name(), "channel closed");
    }

    /// Connects and processes frames according to the reconnect policy.
    pub(crate) async fn run<D: ChannelDriver>(&self, driver: &D) -> Result<(), ChannelError> {
        match self.policy {
            ReconnectPolicy::Never => {
                self.set_state(ChannelState::Connecting);
                let connection = match self.connect().await {
                    Ok(c) => c,
                    Err(e) => {
                        self.set_state(ChannelState::Closed);
                        return Err(e);
                    }
                };
                self.run_with_connection(Box::new(connection), driver).await;
                Ok(())
            }
            ReconnectPolicy::Backoff { initial, max } => {
                let mut backoff = initial;
                loop {
                    self.set_state(ChannelState::Connecting);
                    match self.connect().await {
                        Ok(connection) => {
                            backoff = initial;
                            self.session(Box::new(connection), driver).await;
                        }
                        Err(e) => {
                            warn!(channel = driver.name(), error = %e, "connection attempt failed");
                        }
                    }
                    self.set_state(ChannelState::Reconnecting);
                    info!(
                        channel = driver.name(),
                        backoff_ms = backoff.as_millis() as u64,
                        "reconnecting"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = std::cmp::min(backoff * 2, max);
                }
            }
        }
    }

    /// One connection's worth of work: handshake, then the frame loop until
    /// the transport goes away. State transitions beyond `Open` are left to
    /// the caller, which knows the policy.
    async fn session<D: ChannelDriver>(
        &self,
        mut connection: Box<dyn WebSocketConnection>,
        driver: &D,
    ) {
        if let Err(e) = driver.on_open(connection.as_mut()).await {
            error!(channel = driver.name(), error = %e, "handshake failed");
            return;
        }
        self.set_state(ChannelState::Open);

        loop {
            match connection.read_message().await {
                Some(Ok(Message::Text(text))) => driver.on_frame(text.as_str()),
                Some(Ok(Message::Close(_))) => {
                    info!(channel = driver.name(), "received close frame from server");
                    break;
                }
                Some(Ok(other)) => {
                    debug!(channel = driver.name(), ?other, "ignoring non-text message");
                }
                Some(Err(e)) => {
                    error!(channel = driver.name(), error = %e, "websocket error");
                    break;
                }
                None => {
                    info!(channel = driver.name(), "connection closed");
                    break;
                }
            }
        }
    }
}
