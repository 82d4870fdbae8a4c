//! Meeting lifecycle adapter
//!
//! Consumes raw SDK callbacks on a single pump task, keeps the derived
//! `in_meeting` / `sharing` flags, and publishes semantic [`MeetingEvent`]s
//! on the [`EventBus`].

use crate::config::KioskConfig;
use crate::meeting::auth::generate_jwt;
use crate::meeting::events::EventBus;
use crate::meeting::sdk::{
    CallbackReceiver, JoinRequest, MeetingError, MeetingResult, MeetingSdk, MonitorTarget,
    ParticipantId, SdkCallback,
};
use crate::meeting::types::{MeetingEvent, MeetingStatus, ShareStatus, AUTH_SUCCESS};
use parking_lot::Mutex as ParkingMutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay before sharing when others are already present at join time
pub const SHARE_START_DELAY: Duration = Duration::from_secs(1);

/// Fallback participant poll in case a join callback is lost
pub const PARTICIPANT_POLL_INTERVAL: Duration = Duration::from_secs(2);

struct LifecycleState {
    initialized: bool,
    authenticated: bool,
    in_meeting: bool,
    sharing: bool,
    status: String,
    pump: Option<JoinHandle<()>>,
    auth_timeout: Option<JoinHandle<()>>,
}

impl LifecycleState {
    fn reset_flags(&mut self) {
        self.initialized = false;
        self.authenticated = false;
        self.in_meeting = false;
        self.sharing = false;
    }
}

struct Inner {
    sdk: Arc<dyn MeetingSdk>,
    config: KioskConfig,
    events: EventBus,
    state: ParkingMutex<LifecycleState>,
}

#[derive(Clone)]
pub struct MeetingLifecycle {
    inner: Arc<Inner>,
}

impl MeetingLifecycle {
    pub fn new(sdk: Arc<dyn MeetingSdk>, config: KioskConfig, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                sdk,
                config,
                events,
                state: ParkingMutex::new(LifecycleState {
                    initialized: false,
                    authenticated: false,
                    in_meeting: false,
                    sharing: false,
                    status: "Not initialized".to_string(),
                    pump: None,
                    auth_timeout: None,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MeetingEvent> {
        self.inner.events.subscribe()
    }

    pub fn status(&self) -> String {
        self.inner.state.lock().status.clone()
    }

    pub fn is_in_meeting(&self) -> bool {
        self.inner.state.lock().in_meeting
    }

    pub fn is_sharing(&self) -> bool {
        self.inner.state.lock().sharing
    }

    fn set_status(&self, status: impl Into<String>) {
        self.inner.state.lock().status = status.into();
    }

    fn publish(&self, event: MeetingEvent) {
        self.inner.events.publish(event);
    }

    /// Stop consuming callbacks from the current SDK session
    fn detach(&self) {
        let (pump, timeout) = {
            let mut state = self.inner.state.lock();
            (state.pump.take(), state.auth_timeout.take())
        };
        if let Some(pump) = pump {
            pump.abort();
        }
        if let Some(timeout) = timeout {
            timeout.abort();
        }
    }

    /// Initialize the SDK and start authenticating.
    ///
    /// Success only means authentication is underway; `Initialized` is
    /// published once the auth callback reports success.
    pub async fn initialize(&self) -> MeetingResult<()> {
        self.detach();
        let jwt = generate_jwt(&self.inner.config.zoom)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let pump = self.spawn_pump(rx);
        self.inner.state.lock().pump = Some(pump);

        if let Err(e) = self.inner.sdk.initialize(tx, &jwt).await {
            tracing::error!("[MeetingLifecycle] Initialization error: {}", e);
            self.detach();
            self.set_status(format!("Initialization failed: {}", e));
            return Err(e);
        }

        let mut state = self.inner.state.lock();
        if !state.authenticated {
            state.status = "Authenticating...".to_string();
            state.auth_timeout = Some(self.spawn_auth_timeout());
            tracing::info!("[MeetingLifecycle] Authentication requested, waiting for callback...");
        }
        Ok(())
    }

    fn spawn_pump(&self, mut rx: CallbackReceiver) -> JoinHandle<()> {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            while let Some(callback) = rx.recv().await {
                lifecycle.handle_callback(callback);
            }
            tracing::debug!("[MeetingLifecycle] SDK callback channel closed");
        })
    }

    fn spawn_auth_timeout(&self) -> JoinHandle<()> {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(AUTH_TIMEOUT).await;
            if !lifecycle.inner.state.lock().authenticated {
                tracing::error!(
                    "[MeetingLifecycle] Auth callback did not fire within {}s",
                    AUTH_TIMEOUT.as_secs()
                );
                lifecycle.publish(MeetingEvent::Error(
                    "Authentication timeout - SDK may not be ready for reconnection".to_string(),
                ));
            }
        })
    }

    fn handle_callback(&self, callback: SdkCallback) {
        match callback {
            SdkCallback::AuthResult(code) => self.on_auth_result(code),
            SdkCallback::IdentityExpired => {
                tracing::warn!("[MeetingLifecycle] Identity expired, need to re-authenticate");
                self.publish(MeetingEvent::Error("Zoom identity expired".to_string()));
            }
            SdkCallback::MeetingStatus { status, result } => self.on_meeting_status(status, result),
            SdkCallback::ShareStatus(code) => self.on_share_status(code),
            SdkCallback::ParticipantsJoined(ids) => self.on_participants_joined(&ids),
            SdkCallback::ParticipantsLeft(ids) => {
                tracing::info!("[MeetingLifecycle] Participant left: {:?}", ids);
            }
        }
    }

    fn on_auth_result(&self, code: i32) {
        tracing::info!("[MeetingLifecycle] Auth result: {}", code);
        let timeout = self.inner.state.lock().auth_timeout.take();
        if let Some(timeout) = timeout {
            timeout.abort();
        }

        if code == AUTH_SUCCESS {
            {
                let mut state = self.inner.state.lock();
                state.authenticated = true;
                state.initialized = true;
                state.status = "Authenticated".to_string();
            }
            self.publish(MeetingEvent::Initialized);
        } else {
            self.set_status(format!("Authentication failed: {}", code));
            self.publish(MeetingEvent::Error(format!(
                "Authentication failed with code: {}",
                code
            )));
        }
    }

    fn on_meeting_status(&self, code: i32, result: i32) {
        let status = MeetingStatus::from_code(code);
        tracing::info!("[MeetingLifecycle] Meeting status: {:?} result: {}", status, result);

        match status {
            MeetingStatus::Connecting => self.set_status("Connecting to meeting..."),
            MeetingStatus::WaitingForHost => self.set_status("Waiting for host..."),
            MeetingStatus::Reconnecting => self.set_status("Reconnecting..."),
            MeetingStatus::InWaitingRoom => self.set_status("In waiting room..."),
            MeetingStatus::InMeeting => {
                {
                    let mut state = self.inner.state.lock();
                    state.in_meeting = true;
                    state.status = "In meeting".to_string();
                }
                self.publish(MeetingEvent::MeetingJoined);

                let others = self.other_participant_count();
                tracing::info!("[MeetingLifecycle] Joined with {} other participants", others);
                if others > 0 {
                    self.publish(MeetingEvent::OtherParticipantPresent);
                    self.spawn_share_start(SHARE_START_DELAY);
                }
            }
            MeetingStatus::Disconnecting => {
                let mut state = self.inner.state.lock();
                state.status = "Disconnecting...".to_string();
                state.in_meeting = false;
                state.sharing = false;
            }
            MeetingStatus::Ended | MeetingStatus::Failed => {
                {
                    let mut state = self.inner.state.lock();
                    state.in_meeting = false;
                    state.sharing = false;
                    state.status = "Disconnected".to_string();
                }
                let name = if status == MeetingStatus::Ended {
                    "ended"
                } else {
                    "failed"
                };
                tracing::info!("[MeetingLifecycle] Meeting {}, reporting disconnect", name);
                self.publish(MeetingEvent::Disconnected(format!(
                    "Meeting {} with status: {}",
                    name, code
                )));
            }
            MeetingStatus::Idle => {
                let was_in_meeting = {
                    let mut state = self.inner.state.lock();
                    let was = state.in_meeting;
                    state.in_meeting = false;
                    state.sharing = false;
                    state.status = "Disconnected".to_string();
                    was
                };
                if was_in_meeting {
                    self.publish(MeetingEvent::Disconnected("Meeting idle/cancelled".to_string()));
                }
            }
            MeetingStatus::Unknown(other) => {
                tracing::debug!("[MeetingLifecycle] Ignoring meeting status {}", other);
            }
        }
    }

    fn on_share_status(&self, code: i32) {
        match ShareStatus::from_code(code) {
            ShareStatus::Started => {
                {
                    let mut state = self.inner.state.lock();
                    state.sharing = true;
                    state.status = "Screen sharing active".to_string();
                }
                self.publish(MeetingEvent::SharingStarted);
            }
            ShareStatus::Stopped => {
                let was_sharing_in_meeting = {
                    let mut state = self.inner.state.lock();
                    let was = state.sharing && state.in_meeting;
                    state.sharing = false;
                    was
                };
                if was_sharing_in_meeting {
                    self.publish(MeetingEvent::SharingStopped);
                }
            }
            ShareStatus::Other(other) => {
                tracing::debug!("[MeetingLifecycle] Share status {}", other);
            }
        }
    }

    fn on_participants_joined(&self, ids: &[ParticipantId]) {
        tracing::info!("[MeetingLifecycle] Participants joined: {:?}", ids);
        let (in_meeting, sharing) = {
            let state = self.inner.state.lock();
            (state.in_meeting, state.sharing)
        };
        if !in_meeting || ids.is_empty() {
            return;
        }

        let others = ids.iter().filter(|id| !self.inner.sdk.is_myself(**id)).count();
        if others > 0 {
            self.publish(MeetingEvent::OtherParticipantPresent);
            if !sharing {
                tracing::info!("[MeetingLifecycle] Other participant detected, starting screen share...");
                self.spawn_share_start(Duration::ZERO);
            }
        }
    }

    fn spawn_share_start(&self, delay: Duration) {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let ready = {
                let state = lifecycle.inner.state.lock();
                state.in_meeting && !state.sharing
            };
            if !ready {
                return;
            }
            if let Err(e) = lifecycle.start_screen_share().await {
                tracing::error!("[MeetingLifecycle] Failed to start screen share: {}", e);
            }
        });
    }

    /// Participants other than the kiosk itself; 0 when not in a meeting
    pub fn other_participant_count(&self) -> usize {
        if !self.is_in_meeting() {
            return 0;
        }
        let sdk = &self.inner.sdk;
        sdk.participant_ids()
            .into_iter()
            .filter(|id| !sdk.is_myself(*id))
            .count()
    }

    /// Join the configured PMI
    pub async fn start_meeting(&self) -> MeetingResult<()> {
        {
            let mut state = self.inner.state.lock();
            if !state.initialized {
                return Err(MeetingError::NotInitialized);
            }
            state.status = "Starting meeting...".to_string();
        }

        let zoom = &self.inner.config.zoom;
        let digits: String = zoom.pmi.chars().filter(char::is_ascii_digit).collect();
        let meeting_number = digits
            .parse::<u64>()
            .map_err(|_| MeetingError::InvalidMeetingNumber(zoom.pmi.clone()))?;

        tracing::info!("[MeetingLifecycle] Joining meeting {}", meeting_number);
        self.inner
            .sdk
            .join_meeting(JoinRequest {
                meeting_number,
                display_name: zoom.display_name.clone(),
                passcode: zoom.passcode.clone(),
                direct_share_desktop: true,
                video_off: false,
                audio_off: false,
            })
            .await
    }

    pub async fn start_screen_share(&self) -> MeetingResult<()> {
        {
            let mut state = self.inner.state.lock();
            if !state.in_meeting {
                return Err(MeetingError::NotInMeeting);
            }
            state.status = "Starting screen share...".to_string();
        }

        let screen = &self.inner.config.screen;
        let monitor = MonitorTarget::from_index(screen.monitor_index);
        self.inner
            .sdk
            .start_monitor_share(monitor, screen)
            .await
    }

    pub async fn enable_remote_control(&self) -> MeetingResult<()> {
        {
            let mut state = self.inner.state.lock();
            if !state.sharing {
                return Err(MeetingError::NotSharing);
            }
            state.status = "Enabling remote control...".to_string();
        }

        self.inner
            .sdk
            .enable_remote_control(&self.inner.config.remote_control)
            .await?;

        self.set_status("Ready - Remote control enabled");
        self.publish(MeetingEvent::RemoteControlEnabled);
        Ok(())
    }

    /// Stop sharing, leave and release the SDK. Callbacks from the old
    /// session are ignored from here on.
    pub async fn cleanup(&self) {
        self.detach();
        let (sharing, in_meeting) = {
            let state = self.inner.state.lock();
            (state.sharing, state.in_meeting)
        };

        let sdk = &self.inner.sdk;
        if sharing {
            if let Err(e) = sdk.stop_share().await {
                tracing::warn!("[MeetingLifecycle] Stop share failed during cleanup: {}", e);
            }
        }
        if in_meeting {
            if let Err(e) = sdk.leave_meeting().await {
                tracing::warn!("[MeetingLifecycle] Leave failed during cleanup: {}", e);
            }
        }
        if let Err(e) = sdk.cleanup().await {
            tracing::error!("[MeetingLifecycle] Cleanup error: {}", e);
        }

        self.inner.state.lock().reset_flags();
    }

    /// Resolve once someone other than the kiosk is in the meeting.
    ///
    /// Listens for `OtherParticipantPresent` and polls the participant list
    /// every 2s in case the join callback never arrives. Returns false if
    /// `cancel` fires first.
    pub async fn wait_for_other_participant(&self, cancel: &CancellationToken) -> bool {
        let mut rx = self.subscribe();
        if self.other_participant_count() > 0 {
            return true;
        }

        let mut poll = tokio::time::interval(PARTICIPANT_POLL_INTERVAL);
        poll.tick().await;
        let mut listening = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                event = rx.recv(), if listening => match event {
                    Ok(MeetingEvent::OtherParticipantPresent) => return true,
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => listening = false,
                },
                _ = poll.tick() => {
                    let count = self.other_participant_count();
                    if count > 0 {
                        tracing::info!("[MeetingLifecycle] Participant poll found {} other(s)", count);
                        return true;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meeting::mock::{MockMeetingSdk, MockTiming};

    fn config() -> KioskConfig {
        let mut config = KioskConfig::default();
        config.zoom.sdk_key = "key".into();
        config.zoom.sdk_secret = "secret".into();
        config.zoom.pmi = "555-123-4567".into();
        config
    }

    fn lifecycle_with(sdk: Arc<MockMeetingSdk>, config: KioskConfig) -> MeetingLifecycle {
        MeetingLifecycle::new(sdk, config, EventBus::default())
    }

    async fn next_event(rx: &mut broadcast::Receiver<MeetingEvent>) -> MeetingEvent {
        tokio::time::timeout(Duration::from_secs(60), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event bus closed")
    }

    async fn joined(sdk: &Arc<MockMeetingSdk>) -> (MeetingLifecycle, broadcast::Receiver<MeetingEvent>) {
        let lifecycle = lifecycle_with(sdk.clone(), config());
        let mut rx = lifecycle.subscribe();
        lifecycle.initialize().await.unwrap();
        assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);
        lifecycle.start_meeting().await.unwrap();
        assert_eq!(next_event(&mut rx).await, MeetingEvent::MeetingJoined);
        (lifecycle, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_session() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, mut rx) = joined(&sdk).await;
        assert!(lifecycle.is_in_meeting());
        assert_eq!(lifecycle.status(), "In meeting");
        assert_eq!(sdk.last_join().unwrap().meeting_number, 5551234567);

        sdk.add_participant(7);
        assert_eq!(next_event(&mut rx).await, MeetingEvent::OtherParticipantPresent);
        assert_eq!(next_event(&mut rx).await, MeetingEvent::SharingStarted);
        assert!(lifecycle.is_sharing());
        assert_eq!(sdk.last_share(), Some(MonitorTarget::Primary));

        lifecycle.enable_remote_control().await.unwrap();
        assert_eq!(next_event(&mut rx).await, MeetingEvent::RemoteControlEnabled);
        assert_eq!(lifecycle.status(), "Ready - Remote control enabled");
        assert_eq!(lifecycle.other_participant_count(), 1);

        // The last guest leaving does not end the session
        sdk.remove_participant(7);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(lifecycle.other_participant_count(), 0);
        assert!(lifecycle.is_in_meeting());
        assert!(lifecycle.is_sharing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_others_present_at_join_start_share() {
        let sdk = Arc::new(MockMeetingSdk::new());
        sdk.add_participant_silently(9);
        let (lifecycle, mut rx) = joined(&sdk).await;

        assert_eq!(next_event(&mut rx).await, MeetingEvent::OtherParticipantPresent);
        assert_eq!(next_event(&mut rx).await, MeetingEvent::SharingStarted);
        assert!(lifecycle.is_sharing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_resets_flags() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, mut rx) = joined(&sdk).await;

        sdk.simulate_disconnect();
        assert_eq!(
            next_event(&mut rx).await,
            MeetingEvent::Disconnected("Meeting failed with status: 6".into())
        );
        assert!(!lifecycle.is_in_meeting());
        assert_eq!(lifecycle.status(), "Disconnected");
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_only_disconnects_after_join() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let lifecycle = lifecycle_with(sdk.clone(), config());
        let mut rx = lifecycle.subscribe();
        lifecycle.initialize().await.unwrap();
        assert_eq!(next_event(&mut rx).await, MeetingEvent::Initialized);

        sdk.emit(SdkCallback::MeetingStatus { status: 0, result: 0 });
        sdk.emit(SdkCallback::IdentityExpired);
        assert_eq!(
            next_event(&mut rx).await,
            MeetingEvent::Error("Zoom identity expired".into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sharing_stopped_event() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, mut rx) = joined(&sdk).await;
        sdk.add_participant(7);
        next_event(&mut rx).await;
        assert_eq!(next_event(&mut rx).await, MeetingEvent::SharingStarted);

        sdk.emit(SdkCallback::ShareStatus(3));
        assert_eq!(next_event(&mut rx).await, MeetingEvent::SharingStopped);
        assert!(!lifecycle.is_sharing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_timeout_reports_error() {
        let sdk = Arc::new(MockMeetingSdk::with_timing(MockTiming {
            auth: Duration::from_secs(30),
            ..MockTiming::default()
        }));
        let lifecycle = lifecycle_with(sdk, config());
        let mut rx = lifecycle.subscribe();
        lifecycle.initialize().await.unwrap();
        assert_eq!(lifecycle.status(), "Authenticating...");

        match next_event(&mut rx).await {
            MeetingEvent::Error(message) => assert!(message.contains("Authentication timeout")),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_preconditions() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let lifecycle = lifecycle_with(sdk.clone(), config());
        assert_eq!(lifecycle.start_meeting().await, Err(MeetingError::NotInitialized));
        assert_eq!(lifecycle.start_screen_share().await, Err(MeetingError::NotInMeeting));
        assert_eq!(lifecycle.enable_remote_control().await, Err(MeetingError::NotSharing));

        let mut bad = config();
        bad.zoom.pmi = "not-a-number".into();
        let lifecycle = lifecycle_with(sdk, bad);
        let mut rx = lifecycle.subscribe();
        lifecycle.initialize().await.unwrap();
        next_event(&mut rx).await;
        assert!(matches!(
            lifecycle.start_meeting().await,
            Err(MeetingError::InvalidMeetingNumber(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_secondary_monitor_share_target() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let mut config = config();
        config.screen.monitor_index = 2;
        config.screen.share_computer_sound = false;
        config.screen.optimize_for_video = true;
        let lifecycle = lifecycle_with(sdk.clone(), config);
        let mut rx = lifecycle.subscribe();
        lifecycle.initialize().await.unwrap();
        next_event(&mut rx).await;
        lifecycle.start_meeting().await.unwrap();
        next_event(&mut rx).await;

        lifecycle.start_screen_share().await.unwrap();
        assert_eq!(next_event(&mut rx).await, MeetingEvent::SharingStarted);
        assert_eq!(
            sdk.last_share(),
            Some(MonitorTarget::Device(r"\\?\DISPLAY3".to_string()))
        );
        let settings = sdk.last_share_settings().unwrap();
        assert!(!settings.share_computer_sound);
        assert!(settings.stereo_audio);
        assert!(settings.optimize_for_video);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_ignores_stale_callbacks() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, mut rx) = joined(&sdk).await;

        lifecycle.cleanup().await;
        assert!(!lifecycle.is_in_meeting());
        assert!(!sdk.is_attached());

        // The leave produced an ENDED status, which must not surface
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_participant_by_event() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, _rx) = joined(&sdk).await;
        let cancel = CancellationToken::new();

        let waiter = {
            let lifecycle = lifecycle.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { lifecycle.wait_for_other_participant(&cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        sdk.add_participant(4);
        assert!(waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_participant_poll_fallback() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, _rx) = joined(&sdk).await;
        let cancel = CancellationToken::new();

        let waiter = {
            let lifecycle = lifecycle.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { lifecycle.wait_for_other_participant(&cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        sdk.add_participant_silently(4);

        let started = tokio::time::Instant::now();
        assert!(waiter.await.unwrap());
        assert!(started.elapsed() <= PARTICIPANT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_participant_cancelled() {
        let sdk = Arc::new(MockMeetingSdk::new());
        let (lifecycle, _rx) = joined(&sdk).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!lifecycle.wait_for_other_participant(&cancel).await);
    }
}
