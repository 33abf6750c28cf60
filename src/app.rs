//! The main application logic, decoupled from the entry point.
//!
//! `AppBuilder` wires configuration, renderers, and channel clients together
//! and spawns one task per active channel. Identity gating lives here: an
//! absent or invalid subscriber identity means the notification channel is
//! never constructed and no connection is attempted.

use crate::{
    channel::{channel_url, ChannelState, MetricsClient, NotifyClient, WebSocketConnection},
    config::Config,
    core::{MetricsSink, NotificationSink, SubscriberIdentity},
    render::{CounterRenderer, LoggingSurface, RenderSurface, ToastRenderer},
    task_manager::TaskManager,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// A handle to the running application.
pub struct App {
    task_manager: TaskManager,
    shutdown_tx: watch::Sender<bool>,
    notify_state: Option<watch::Receiver<ChannelState>>,
    metrics_state: watch::Receiver<ChannelState>,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    /// The notification channel's state, or `None` when identity gating
    /// disabled the channel.
    pub fn notify_state(&self) -> Option<watch::Receiver<ChannelState>> {
        self.notify_state.clone()
    }

    /// The metrics channel's state.
    pub fn metrics_state(&self) -> watch::Receiver<ChannelState> {
        self.metrics_state.clone()
    }

    /// A handle that triggers graceful shutdown when sent `true`.
    pub fn shutdown_handle(&self) -> watch::Sender<bool> {
        self.shutdown_tx.clone()
    }

    /// Waits for the shutdown signal and then joins all channel tasks.
    ///
    /// # Errors
    /// Currently infallible in practice; kept fallible for parity with the
    /// binary entry point.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.task_manager.shutdown_rx();
        if !*shutdown_rx.borrow_and_update() {
            shutdown_rx.changed().await.ok();
        }
        info!("shutdown signal received, waiting for channel tasks");

        self.task_manager.shutdown().await;
        info!("all tasks shut down");
        Ok(())
    }
}

/// Builder for the main application.
///
/// This pattern separates constructing the application's components from
/// running it, and provides a convenient way to override components for
/// testing purposes.
pub struct AppBuilder {
    config: Config,
    surface: Option<Arc<dyn RenderSurface>>,
    notification_sink: Option<Arc<dyn NotificationSink>>,
    metrics_sink: Option<Arc<dyn MetricsSink>>,
    notify_ws: Option<Box<dyn WebSocketConnection>>,
    metrics_ws: Option<Box<dyn WebSocketConnection>>,
}

impl AppBuilder {
    /// Creates a new `AppBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            surface: None,
            notification_sink: None,
            metrics_sink: None,
            notify_ws: None,
            metrics_ws: None,
        }
    }

    /// Overrides the rendering surface (defaults to [`LoggingSurface`]).
    pub fn surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Overrides the notification sink for testing.
    pub fn notification_sink_override(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Overrides the metrics sink for testing.
    pub fn metrics_sink_override(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics_sink = Some(sink);
        self
    }

    /// Overrides the notification channel's connection for testing.
    pub fn notify_ws_override(mut self, ws: Box<dyn WebSocketConnection>) -> Self {
        self.notify_ws = Some(ws);
        self
    }

    /// Overrides the metrics channel's connection for testing.
    pub fn metrics_ws_override(mut self, ws: Box<dyn WebSocketConnection>) -> Self {
        self.metrics_ws = Some(ws);
        self
    }

    /// Builds the application and spawns the channel tasks.
    ///
    /// # Errors
    /// Currently infallible in practice; kept fallible so wiring additions do
    /// not ripple through callers.
    pub fn build(self) -> Result<App> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task_manager = TaskManager::new(shutdown_rx.clone());

        let surface = self
            .surface
            .unwrap_or_else(|| Arc::new(LoggingSurface::new()));
        let notification_sink = self
            .notification_sink
            .unwrap_or_else(|| Arc::new(ToastRenderer::new(surface.clone())));
        let metrics_sink = self
            .metrics_sink
            .unwrap_or_else(|| Arc::new(CounterRenderer::new(surface.clone())));

        let channels = &self.config.channels;
        let policy = channels.reconnect.policy();

        // Metrics channel: identity-independent, always set up.
        let metrics_client = MetricsClient::new(
            channel_url(&channels.host, channels.metrics_port),
            metrics_sink,
            channels.allow_invalid_certs,
            policy.clone(),
        );
        let metrics_state = metrics_client.state();
        spawn_metrics(&task_manager, metrics_client, self.metrics_ws);

        // Notification channel: only with a valid subscriber identity.
        let notify_state = match self.config.identity.as_deref() {
            Some(raw) => match SubscriberIdentity::new(raw) {
                Ok(identity) => {
                    let notify_client = NotifyClient::new(
                        channel_url(&channels.host, channels.notify_port),
                        identity,
                        notification_sink,
                        channels.allow_invalid_certs,
                        policy,
                    );
                    let state = notify_client.state();
                    spawn_notify(&task_manager, notify_client, self.notify_ws);
                    Some(state)
                }
                Err(e) => {
                    warn!(error = %e, "notification channel disabled");
                    None
                }
            },
            None => {
                info!("no subscriber identity configured; notification channel disabled");
                None
            }
        };

        Ok(App {
            task_manager,
            shutdown_tx,
            notify_state,
            metrics_state,
        })
    }
}

fn spawn_notify(
    task_manager: &TaskManager,
    client: NotifyClient,
    override_ws: Option<Box<dyn WebSocketConnection>>,
) {
    let mut shutdown_rx = task_manager.shutdown_rx();
    match override_ws {
        Some(ws) => task_manager.spawn("notify-channel", async move {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => info!("notify channel task interrupted by shutdown"),
                () = client.run_with_connection(ws) => {}
            }
        }),
        None => task_manager.spawn("notify-channel", async move {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => info!("notify channel task interrupted by shutdown"),
                result = client.run() => {
                    if let Err(e) = result {
                        error!(error = %e, "notify channel failed");
                    }
                }
            }
        }),
    }
}

fn spawn_metrics(
    task_manager: &TaskManager,
    client: MetricsClient,
    override_ws: Option<Box<dyn WebSocketConnection>>,
) {
    let mut shutdown_rx = task_manager.shutdown_rx();
    match override_ws {
        Some(ws) => task_manager.spawn("metrics-channel", async move {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => info!("metrics channel task interrupted by shutdown"),
                () = client.run_with_connection(ws) => {}
            }
        }),
        None => task_manager.spawn("metrics-channel", async move {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => info!("metrics channel task interrupted by shutdown"),
                result = client.run() => {
                    if let Err(e) = result {
                        error!(error = %e, "metrics channel failed");
                    }
                }
            }
        }),
    }
}
