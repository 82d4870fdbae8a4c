//! Kiosk orchestration
//!
//! Wires the meeting lifecycle, recovery watchdog, preference recorder and
//! action player together. Lifecycle events drive everything:
//!
//! ```text
//! initialized     -> join the PMI
//! meetingJoined   -> watchdog.on_connected, replay preferences once
//!                    another participant is present
//! sharingStarted  -> enable remote control
//! disconnected    -> stop replay, watchdog.on_disconnected
//! ```

use crate::automation::{AutomationError, PointerLoader};
use crate::capture::input::ClickCaptureChannel;
use crate::config::KioskConfig;
use crate::meeting::{EventBus, MeetingEvent, MeetingLifecycle, MeetingSdk};
use crate::playback::{ActionPlayer, PlaybackError};
use crate::recorder::{ActionRecorder, RecorderStatus, RecordingError, RecordingResult, RecordingStore};
use crate::recovery::{ReconnectHandler, RecoveryStatus, RecoveryWatchdog};
use anyhow::Context;
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

/// Pause between SDK cleanup and re-initialization on reconnect
pub const RECONNECT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Operator-facing status line, logged and published on a watch channel
pub struct StatusReporter {
    tx: watch::Sender<String>,
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel("Starting".to_string());
        Self { tx }
    }

    pub fn report(&self, status: impl Into<String>) {
        let status = status.into();
        tracing::info!("[Status] {}", status);
        self.tx.send_replace(status);
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Tears the SDK session down and brings it back up
pub struct MeetingReconnector {
    lifecycle: MeetingLifecycle,
    status: Arc<StatusReporter>,
    settle_delay: Duration,
}

impl MeetingReconnector {
    pub fn new(lifecycle: MeetingLifecycle, status: Arc<StatusReporter>) -> Self {
        Self {
            lifecycle,
            status,
            settle_delay: RECONNECT_SETTLE_DELAY,
        }
    }
}

#[async_trait]
impl ReconnectHandler for MeetingReconnector {
    async fn reconnect(&self) -> anyhow::Result<()> {
        self.status.report("Reconnecting...");
        self.lifecycle.cleanup().await;
        tokio::time::sleep(self.settle_delay).await;

        self.status.report("Initializing Zoom SDK...");
        if let Err(e) = self.lifecycle.initialize().await {
            self.status.report(format!("Reconnection failed: {}", e));
            return Err(e).context("Meeting SDK re-initialization failed");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskStatus {
    pub status: String,
    pub meeting_status: String,
    pub in_meeting: bool,
    pub sharing: bool,
    pub other_participants: usize,
    pub recovery: RecoveryStatus,
    pub recorder: RecorderStatus,
    pub has_recording: bool,
    pub playing: bool,
}

/// Keeps the pending replay count up for as long as a replay is scheduled
struct PendingReplay<'a> {
    count: &'a ParkingMutex<usize>,
}

impl Drop for PendingReplay<'_> {
    fn drop(&mut self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
    }
}

pub struct KioskApp {
    config: KioskConfig,
    lifecycle: MeetingLifecycle,
    watchdog: RecoveryWatchdog,
    reconnector: Arc<MeetingReconnector>,
    recorder: Arc<ActionRecorder>,
    capture: ClickCaptureChannel,
    player: Arc<ActionPlayer>,
    status: Arc<StatusReporter>,
    participant_wait: ParkingMutex<Option<CancellationToken>>,
    pending_replays: ParkingMutex<usize>,
    shutdown: CancellationToken,
}

impl KioskApp {
    pub fn new(config: KioskConfig, sdk: Arc<dyn MeetingSdk>, pointer: PointerLoader) -> Arc<Self> {
        let status = Arc::new(StatusReporter::new());
        let lifecycle = MeetingLifecycle::new(sdk, config.clone(), EventBus::default());
        let reconnector = Arc::new(MeetingReconnector::new(lifecycle.clone(), status.clone()));
        let watchdog = RecoveryWatchdog::new(config.recovery.clone(), reconnector.clone());

        let recorder = Arc::new(ActionRecorder::new(RecordingStore::new(
            config.playback.recording_path.clone(),
        )));
        let player = Arc::new(ActionPlayer::new(pointer));
        player.set_playback_speed(config.playback.speed);

        Arc::new(Self {
            config,
            lifecycle,
            watchdog,
            reconnector,
            recorder,
            capture: ClickCaptureChannel::new(),
            player,
            status,
            participant_wait: ParkingMutex::new(None),
            pending_replays: ParkingMutex::new(0),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &MeetingLifecycle {
        &self.lifecycle
    }

    pub fn watchdog(&self) -> &RecoveryWatchdog {
        &self.watchdog
    }

    pub fn recorder(&self) -> &Arc<ActionRecorder> {
        &self.recorder
    }

    pub fn player(&self) -> &Arc<ActionPlayer> {
        &self.player
    }

    pub fn status_reporter(&self) -> &Arc<StatusReporter> {
        &self.status
    }

    /// Start watching for disconnects and bring the SDK up
    pub async fn start(&self) {
        self.watchdog.start();
        self.status.report("Initializing Zoom SDK...");
        if let Err(e) = self.lifecycle.initialize().await {
            self.status.report(format!("Failed to initialize: {}", e));
        }
    }

    /// Consume lifecycle events until shutdown
    pub async fn run_events(self: Arc<Self>) {
        let mut rx = self.lifecycle.subscribe();
        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = rx.recv() => event,
            };
            match event {
                Ok(event) => self.clone().handle_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Kiosk fell behind, {} meeting events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Kiosk event loop finished");
    }

    async fn handle_event(self: Arc<Self>, event: MeetingEvent) {
        match event {
            MeetingEvent::Initialized => {
                self.status.report("SDK initialized, starting meeting...");
                if let Err(e) = self.lifecycle.start_meeting().await {
                    self.status.report(format!("Failed to start meeting: {}", e));
                }
            }
            MeetingEvent::MeetingJoined => {
                self.status.report("Meeting joined, setting up remote control...");
                self.watchdog.on_connected();
                if self.recorder.has_recording() {
                    tokio::spawn(self.clone().apply_preferences_when_ready());
                } else {
                    log_capture_help();
                }
            }
            MeetingEvent::SharingStarted => {
                self.status.report("Screen sharing active");
                let app = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = app.lifecycle.enable_remote_control().await {
                        app.status.report(format!("Failed to enable remote control: {}", e));
                    }
                });
            }
            MeetingEvent::SharingStopped => {
                self.status.report("Screen sharing stopped");
            }
            MeetingEvent::RemoteControlEnabled => {
                self.status.report("Ready - Sharing with remote control enabled");
            }
            MeetingEvent::OtherParticipantPresent => {
                tracing::debug!("Another participant is present");
            }
            MeetingEvent::Disconnected(reason) => {
                self.cancel_participant_wait();
                self.player.stop();
                self.status.report(format!("Disconnected: {}", reason));
                self.watchdog.on_disconnected();
            }
            MeetingEvent::Error(message) => {
                self.status.report(format!("Error: {}", message));
            }
        }
    }

    fn cancel_participant_wait(&self) {
        if let Some(token) = self.participant_wait.lock().take() {
            token.cancel();
        }
    }

    async fn apply_preferences_when_ready(self: Arc<Self>) {
        let token = CancellationToken::new();
        if let Some(previous) = self.participant_wait.lock().replace(token.clone()) {
            previous.cancel();
        }

        if self.lifecycle.other_participant_count() == 0 {
            self.status
                .report("Waiting for another participant to apply preferences...");
            if !self.lifecycle.wait_for_other_participant(&token).await {
                return;
            }
        }

        self.status.report("Applying preferences...");
        self.replay_preferences(&token).await;
    }

    /// Load the saved recording and play it back after the UI settles.
    ///
    /// Capture is refused from the moment this is called until it returns.
    pub async fn replay_preferences(&self, cancel: &CancellationToken) {
        let _pending = {
            let mut count = self.pending_replays.lock();
            if self.recorder.is_recording() {
                tracing::warn!("Skipping preference replay while capture is running");
                return;
            }
            *count += 1;
            PendingReplay {
                count: &self.pending_replays,
            }
        };
        let Some(actions) = self.recorder.load_recording() else {
            return;
        };
        if actions.is_empty() {
            return;
        }

        self.status
            .report(format!("Applying {} preferences...", actions.len()));
        let settle = Duration::from_millis(self.config.playback.replay_delay_ms);
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(settle) => {}
        }
        if self.recorder.is_recording() {
            tracing::warn!("Capture started during the settle delay, skipping preference replay");
            return;
        }

        match self.player.play_actions(&actions, cancel).await {
            Ok(()) if cancel.is_cancelled() => {}
            Ok(()) => self.status.report("Preferences applied"),
            Err(PlaybackError::Automation(AutomationError::Unavailable)) => {
                self.status
                    .report("Preferences unavailable - input handler needs to be rebuilt");
            }
            Err(e) => self
                .status
                .report(format!("Failed to apply preferences: {}", e)),
        }
    }

    /// Begin capturing clicks. Refused while a replay is scheduled or running.
    pub fn start_capture(&self) -> RecordingResult<()> {
        // Held until the recorder is running so no replay can start in between
        let pending = self.pending_replays.lock();
        if *pending > 0 || self.player.is_playing() {
            return Err(RecordingError::CaptureError(
                "Cannot capture while preferences are being applied".to_string(),
            ));
        }
        if self.recorder.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }

        self.capture.start(self.recorder.clone())?;
        self.recorder.start_recording();
        drop(pending);
        self.status.report("Capturing started - Press F9 to stop");
        Ok(())
    }

    /// Stop capturing and persist. `Ok(None)` when nothing was running.
    pub fn stop_capture(&self) -> RecordingResult<Option<usize>> {
        self.capture.stop();
        self.recorder.stop_recording()
    }

    pub async fn reconnect(&self) -> anyhow::Result<()> {
        self.cancel_participant_wait();
        self.player.stop();
        self.reconnector.reconnect().await
    }

    pub fn snapshot(&self) -> KioskStatus {
        KioskStatus {
            status: self.status.current(),
            meeting_status: self.lifecycle.status(),
            in_meeting: self.lifecycle.is_in_meeting(),
            sharing: self.lifecycle.is_sharing(),
            other_participants: self.lifecycle.other_participant_count(),
            recovery: self.watchdog.status(),
            recorder: self.recorder.status(),
            has_recording: self.recorder.has_recording(),
            playing: self.player.is_playing(),
        }
    }

    pub async fn shutdown(&self) {
        tracing::info!("Shutting down kiosk");
        self.shutdown.cancel();
        self.cancel_participant_wait();
        self.player.stop();
        if self.recorder.is_recording() {
            if let Err(e) = self.stop_capture() {
                tracing::warn!("Failed to save capture on shutdown: {}", e);
            }
        }
        self.watchdog.stop();
        self.lifecycle.cleanup().await;
    }
}

fn log_capture_help() {
    tracing::info!("========================================");
    tracing::info!("  KEYBOARD SHORTCUTS");
    tracing::info!("========================================");
    tracing::info!("  F9  - Start/Stop capturing (toggle-recording)");
    tracing::info!("  F10 - Force stop capturing (stop-recording)");
    tracing::info!("To capture preferences:");
    tracing::info!("  1. Press F9 to start capturing");
    tracing::info!("  2. Navigate to menu and configure settings");
    tracing::info!("  3. Press F9 again to stop capturing");
    tracing::info!("========================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{AutomationResult, DisplayBounds, Point, PointerControl};
    use crate::capture::input::{MouseAction, MouseButton};
    use crate::meeting::MockMeetingSdk;
    use crate::recovery::RecoveryState;

    fn unavailable() -> PointerLoader {
        Arc::new(|| -> AutomationResult<Arc<dyn PointerControl>> { Err(AutomationError::Unavailable) })
    }

    /// Pointer that only counts clicks
    #[derive(Default)]
    struct ClickCounter {
        position: ParkingMutex<Point>,
        clicks: ParkingMutex<usize>,
    }

    impl PointerControl for ClickCounter {
        fn move_to(&self, x: i32, y: i32) -> AutomationResult<()> {
            *self.position.lock() = Point::new(x, y);
            Ok(())
        }

        fn position(&self) -> AutomationResult<Point> {
            Ok(*self.position.lock())
        }

        fn click(&self, _button: MouseButton) -> AutomationResult<()> {
            *self.clicks.lock() += 1;
            Ok(())
        }

        fn set_mouse_delay(&self, _delay: Duration) {}

        fn mouse_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn primary_display(&self) -> Option<DisplayBounds> {
            None
        }
    }

    fn counting(pointer: &Arc<ClickCounter>) -> PointerLoader {
        let pointer = pointer.clone();
        Arc::new(move || -> AutomationResult<Arc<dyn PointerControl>> { Ok(pointer.clone()) })
    }

    fn config(dir: &std::path::Path) -> KioskConfig {
        let mut config = KioskConfig::default();
        config.zoom.sdk_key = "key".into();
        config.zoom.sdk_secret = "secret".into();
        config.zoom.pmi = "1112223333".into();
        config.playback.recording_path = dir.join("user-prefs.json");
        config
    }

    async fn wait_for_status(app: &KioskApp, expected: &str) {
        let mut rx = app.status_reporter().subscribe();
        tokio::time::timeout(Duration::from_secs(120), async {
            loop {
                if rx.borrow_and_update().as_str() == expected {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("status never became {:?}", expected));
    }

    #[test]
    fn test_status_reporter_publishes() {
        let reporter = StatusReporter::new();
        let rx = reporter.subscribe();
        reporter.report("In meeting");
        assert_eq!(reporter.current(), "In meeting");
        assert_eq!(*rx.borrow(), "In meeting");
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_reaches_remote_control() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = Arc::new(MockMeetingSdk::new());
        let app = KioskApp::new(config(dir.path()), sdk.clone(), unavailable());
        let events = tokio::spawn(app.clone().run_events());

        app.start().await;
        wait_for_status(&app, "Meeting joined, setting up remote control...").await;
        sdk.add_participant(5);
        wait_for_status(&app, "Ready - Sharing with remote control enabled").await;

        let snapshot = app.snapshot();
        assert!(snapshot.in_meeting);
        assert!(snapshot.sharing);
        assert_eq!(snapshot.recovery.state, RecoveryState::Monitoring);

        app.shutdown().await;
        events.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_triggers_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = Arc::new(MockMeetingSdk::new());
        let app = KioskApp::new(config(dir.path()), sdk.clone(), unavailable());
        let events = tokio::spawn(app.clone().run_events());

        app.start().await;
        wait_for_status(&app, "Meeting joined, setting up remote control...").await;

        sdk.simulate_disconnect();
        wait_for_status(&app, "Disconnected: Meeting failed with status: 6").await;
        assert_eq!(app.watchdog().state(), RecoveryState::Recovering);

        // Retry fires, SDK is re-initialized and the meeting is rejoined
        wait_for_status(&app, "Meeting joined, setting up remote control...").await;
        assert_eq!(sdk.initialize_calls(), 2);
        assert_eq!(app.watchdog().state(), RecoveryState::Monitoring);

        app.shutdown().await;
        events.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_pointer_backend_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let sdk = Arc::new(MockMeetingSdk::new());
        let config = config(dir.path());
        RecordingStore::new(config.playback.recording_path.clone())
            .save_recording(&[crate::capture::input::MouseAction::click(
                10,
                10,
                0,
                crate::capture::input::MouseButton::Left,
            )])
            .unwrap();

        let app = KioskApp::new(config, sdk.clone(), unavailable());
        let events = tokio::spawn(app.clone().run_events());
        app.start().await;

        wait_for_status(&app, "Waiting for another participant to apply preferences...").await;
        sdk.add_participant(8);
        wait_for_status(&app, "Preferences unavailable - input handler needs to be rebuilt").await;

        app.shutdown().await;
        events.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_control_enabled_leaves_recovery_alone() {
        let dir = tempfile::tempdir().unwrap();
        let app = KioskApp::new(config(dir.path()), Arc::new(MockMeetingSdk::new()), unavailable());

        app.watchdog().on_disconnected();
        app.clone().handle_event(MeetingEvent::RemoteControlEnabled).await;
        assert_eq!(app.watchdog().state(), RecoveryState::Recovering);
        assert_eq!(
            app.status_reporter().current(),
            "Ready - Sharing with remote control enabled"
        );
        app.watchdog().stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_and_replay_never_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        RecordingStore::new(config.playback.recording_path.clone())
            .save_recording(&[MouseAction::click(40, 40, 0, MouseButton::Left)])
            .unwrap();

        let pointer = Arc::new(ClickCounter::default());
        let app = KioskApp::new(config, Arc::new(MockMeetingSdk::new()), counting(&pointer));
        let replay = {
            let app = app.clone();
            tokio::spawn(async move { app.replay_preferences(&CancellationToken::new()).await })
        };

        // Inside the settle delay, before the player has started
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!app.player().is_playing());
        assert!(matches!(app.start_capture(), Err(RecordingError::CaptureError(_))));
        assert!(!app.recorder().is_recording());

        // A recorder started directly still keeps the replay from running
        app.recorder().start_recording();
        replay.await.unwrap();
        assert_eq!(*pointer.clicks.lock(), 0);
        assert_eq!(app.recorder().stop_recording().unwrap(), Some(0));

        // Nothing pending any more
        assert!(!matches!(app.start_capture(), Err(RecordingError::CaptureError(_))));
        let _ = app.stop_capture();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_settle_skips_replay() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        RecordingStore::new(config.playback.recording_path.clone())
            .save_recording(&[MouseAction::click(40, 40, 0, MouseButton::Left)])
            .unwrap();

        let pointer = Arc::new(ClickCounter::default());
        let app = KioskApp::new(config, Arc::new(MockMeetingSdk::new()), counting(&pointer));
        let cancel = CancellationToken::new();
        let replay = {
            let app = app.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { app.replay_preferences(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
        replay.await.unwrap();
        assert_eq!(*pointer.clicks.lock(), 0);

        // Uncancelled, the same recording is applied
        app.replay_preferences(&CancellationToken::new()).await;
        assert_eq!(*pointer.clicks.lock(), 1);
        assert_eq!(app.status_reporter().current(), "Preferences applied");
    }

    #[tokio::test]
    async fn test_capture_unsupported_platform_leaves_recorder_idle() {
        let dir = tempfile::tempdir().unwrap();
        let app = KioskApp::new(config(dir.path()), Arc::new(MockMeetingSdk::new()), unavailable());
        if app.start_capture().is_err() {
            assert!(!app.recorder().is_recording());
        } else {
            assert!(app.recorder().is_recording());
            assert_eq!(app.stop_capture().unwrap(), Some(0));
        }
    }
}
