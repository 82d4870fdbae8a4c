use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use zoom_kiosk_lib::config::{KioskConfig, RecoveryConfig};
use zoom_kiosk_lib::kiosk::{MeetingReconnector, StatusReporter};
use zoom_kiosk_lib::meeting::{EventBus, MeetingEvent, MeetingLifecycle, MockMeetingSdk};
use zoom_kiosk_lib::recovery::{RecoveryState, RecoveryWatchdog};

fn config(max_retries: u32) -> KioskConfig {
    let mut config = KioskConfig::default();
    config.zoom.sdk_key = "key".into();
    config.zoom.sdk_secret = "secret".into();
    config.zoom.pmi = "4445556666".into();
    config.recovery = RecoveryConfig {
        max_retries,
        initial_backoff_ms: 1000,
        max_backoff_ms: 30000,
    };
    config
}

async fn next_event(rx: &mut broadcast::Receiver<MeetingEvent>) -> MeetingEvent {
    tokio::time::timeout(Duration::from_secs(120), rx.recv())
        .await
        .expect("timed out waiting for meeting event")
        .expect("event bus closed")
}

/// Feed lifecycle events into the watchdog the way the kiosk does
fn wire(lifecycle: &MeetingLifecycle, watchdog: &RecoveryWatchdog) -> tokio::task::JoinHandle<()> {
    let mut rx = lifecycle.subscribe();
    let lifecycle = lifecycle.clone();
    let watchdog = watchdog.clone();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event {
                MeetingEvent::Initialized => {
                    let _ = lifecycle.start_meeting().await;
                }
                MeetingEvent::MeetingJoined => watchdog.on_connected(),
                MeetingEvent::Disconnected(_) => watchdog.on_disconnected(),
                _ => {}
            }
        }
    })
}

#[tokio::test(start_paused = true)]
async fn disconnect_is_recovered_through_reinitialization() {
    let sdk = Arc::new(MockMeetingSdk::new());
    let config = config(5);
    let lifecycle = MeetingLifecycle::new(sdk.clone(), config.clone(), EventBus::default());
    let reconnector = Arc::new(MeetingReconnector::new(
        lifecycle.clone(),
        Arc::new(StatusReporter::new()),
    ));
    let watchdog = RecoveryWatchdog::new(config.recovery.clone(), reconnector);
    let mut rx = lifecycle.subscribe();
    let pump = wire(&lifecycle, &watchdog);

    watchdog.start();
    lifecycle.initialize().await.unwrap();
    assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);
    assert_eq!(next_event(&mut rx).await, MeetingEvent::MeetingJoined);

    sdk.simulate_disconnect();
    assert!(matches!(next_event(&mut rx).await, MeetingEvent::Disconnected(_)));

    assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);
    assert_eq!(next_event(&mut rx).await, MeetingEvent::MeetingJoined);
    assert_eq!(sdk.initialize_calls(), 2);

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(watchdog.state(), RecoveryState::Monitoring);
    assert_eq!(watchdog.retry_count(), 0);
    pump.abort();
}

#[tokio::test(start_paused = true)]
async fn failed_reinitialization_exhausts_retries() {
    let sdk = Arc::new(MockMeetingSdk::new());
    let config = config(3);
    let lifecycle = MeetingLifecycle::new(sdk.clone(), config.clone(), EventBus::default());
    let reconnector = Arc::new(MeetingReconnector::new(
        lifecycle.clone(),
        Arc::new(StatusReporter::new()),
    ));
    let watchdog = RecoveryWatchdog::new(config.recovery.clone(), reconnector);
    let mut rx = lifecycle.subscribe();
    let pump = wire(&lifecycle, &watchdog);

    watchdog.start();
    lifecycle.initialize().await.unwrap();
    assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);
    assert_eq!(next_event(&mut rx).await, MeetingEvent::MeetingJoined);

    sdk.set_fail_initialize(true);
    sdk.simulate_disconnect();
    assert!(matches!(next_event(&mut rx).await, MeetingEvent::Disconnected(_)));

    // Three attempts, each 2s settle plus at most 2s, 3s and 5s backoff
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sdk.initialize_calls(), 4);
    assert_eq!(watchdog.state(), RecoveryState::Failed);
    assert!(watchdog.needs_attention());

    // Manual intervention brings it back
    sdk.set_fail_initialize(false);
    watchdog.reset();
    lifecycle.initialize().await.unwrap();
    assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);
    assert_eq!(next_event(&mut rx).await, MeetingEvent::MeetingJoined);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(watchdog.state(), RecoveryState::Monitoring);
    pump.abort();
}
