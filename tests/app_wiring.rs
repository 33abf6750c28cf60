//! Integration tests for application wiring: identity gating and the full
//! config-to-render pipeline through `AppBuilder`.

mod common;

use common::{FakeWebSocket, RecordingSurface};
use dashlink::app::App;
use dashlink::channel::ChannelState;
use dashlink::config::Config;
use dashlink::render::{CounterSlot, Indicator, IndicatorColor};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn config_with_identity(identity: Option<&str>) -> Config {
    Config {
        identity: identity.map(str::to_string),
        ..Config::default()
    }
}

async fn wait_closed(mut state: tokio::sync::watch::Receiver<ChannelState>) {
    timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == ChannelState::Closed),
    )
    .await
    .expect("channel did not close in time")
    .expect("state watch dropped");
}

#[tokio::test]
async fn short_identity_disables_notification_channel() {
    for raw in ["", "a", "ab"] {
        let app = App::builder(config_with_identity(Some(raw)))
            .metrics_ws_override(Box::new(FakeWebSocket::with_text_frames(vec![])))
            .build()
            .unwrap();

        assert!(
            app.notify_state().is_none(),
            "identity {raw:?} must not produce a notification channel"
        );

        app.shutdown_handle().send(true).unwrap();
        app.run().await.unwrap();
    }
}

#[tokio::test]
async fn missing_identity_disables_notification_channel() {
    let app = App::builder(config_with_identity(None))
        .metrics_ws_override(Box::new(FakeWebSocket::with_text_frames(vec![])))
        .build()
        .unwrap();

    assert!(app.notify_state().is_none());

    app.shutdown_handle().send(true).unwrap();
    app.run().await.unwrap();
}

#[tokio::test]
async fn valid_identity_opens_channel_and_registers_once() {
    let ws = FakeWebSocket::with_text_frames(vec![]);
    let sent = ws.sent_handle();
    let app = App::builder(config_with_identity(Some("alice")))
        .notify_ws_override(Box::new(ws))
        .metrics_ws_override(Box::new(FakeWebSocket::with_text_frames(vec![])))
        .build()
        .unwrap();

    let state = app.notify_state().expect("channel must be set up");
    wait_closed(state).await;
    assert_eq!(sent.lock().unwrap().as_slice(), ["alice"]);

    app.shutdown_handle().send(true).unwrap();
    app.run().await.unwrap();
}

#[tokio::test]
async fn frames_flow_from_both_channels_to_the_surface() {
    let surface = Arc::new(RecordingSurface::default());
    let app = App::builder(config_with_identity(Some("alice")))
        .surface(surface.clone())
        .notify_ws_override(Box::new(FakeWebSocket::with_text_frames(vec![
            r#"{"head":"Build","msg":"Deploy OK","kind":"success","timeout":4000}"#,
        ])))
        .metrics_ws_override(Box::new(FakeWebSocket::with_text_frames(vec![
            r#"{"in":10,"out":3,"tot":-2,"error":false}"#,
        ])))
        .build()
        .unwrap();

    wait_closed(app.notify_state().unwrap()).await;
    wait_closed(app.metrics_state()).await;

    let toasts = surface.toasts.lock().unwrap();
    assert_eq!(toasts.len(), 1);
    assert!(toasts[0].markup.contains("Deploy OK"));
    assert_eq!(toasts[0].timeout, Duration::from_millis(4000));
    drop(toasts);

    assert_eq!(surface.last_counter(CounterSlot::Total).unwrap(), "0");
    assert_eq!(
        surface.last_indicator(Indicator::General).unwrap(),
        IndicatorColor::Nominal
    );
    assert_eq!(
        surface.last_indicator(Indicator::Total).unwrap(),
        IndicatorColor::Warning
    );

    app.shutdown_handle().send(true).unwrap();
    app.run().await.unwrap();
}
