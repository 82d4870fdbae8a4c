//! In-process stand-in for the vendor SDK
//!
//! Used when no vendor SDK is linked. Replays the callback sequence of a
//! real session with fixed delays and lets tests script participants and
//! disconnects.

use crate::config::{RemoteControlConfig, ScreenConfig};
use crate::meeting::sdk::{
    CallbackSender, JoinRequest, MeetingError, MeetingResult, MeetingSdk, MonitorTarget,
    ParticipantId, SdkCallback,
};
use crate::meeting::types::{MeetingStatus, AUTH_SUCCESS};
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Participant id the mock reports for the kiosk itself
pub const MOCK_SELF_ID: ParticipantId = 1;

#[derive(Debug, Clone, Copy)]
pub struct MockTiming {
    pub auth: Duration,
    pub join: Duration,
    pub share: Duration,
    pub remote_control: Duration,
}

impl Default for MockTiming {
    fn default() -> Self {
        Self {
            auth: Duration::from_millis(500),
            join: Duration::from_millis(1000),
            share: Duration::from_millis(500),
            remote_control: Duration::from_millis(300),
        }
    }
}

pub struct MockMeetingSdk {
    timing: MockTiming,
    callbacks: ParkingMutex<Option<CallbackSender>>,
    participants: ParkingMutex<Vec<ParticipantId>>,
    fail_initialize: AtomicBool,
    initialize_calls: AtomicU32,
    last_join: ParkingMutex<Option<JoinRequest>>,
    last_share: ParkingMutex<Option<(MonitorTarget, ScreenConfig)>>,
}

impl MockMeetingSdk {
    pub fn new() -> Self {
        Self::with_timing(MockTiming::default())
    }

    pub fn with_timing(timing: MockTiming) -> Self {
        Self {
            timing,
            callbacks: ParkingMutex::new(None),
            participants: ParkingMutex::new(Vec::new()),
            fail_initialize: AtomicBool::new(false),
            initialize_calls: AtomicU32::new(0),
            last_join: ParkingMutex::new(None),
            last_share: ParkingMutex::new(None),
        }
    }

    fn sender(&self) -> Option<CallbackSender> {
        self.callbacks.lock().clone()
    }

    /// Deliver a raw callback, as the vendor SDK would
    pub fn emit(&self, callback: SdkCallback) {
        if let Some(tx) = self.sender() {
            let _ = tx.send(callback);
        }
    }

    fn emit_after(&self, delay: Duration, callback: SdkCallback) {
        let Some(tx) = self.sender() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(callback);
        });
    }

    /// Another participant joins and the join callback fires
    pub fn add_participant(&self, id: ParticipantId) {
        self.add_participant_silently(id);
        self.emit(SdkCallback::ParticipantsJoined(vec![id]));
    }

    /// Another participant joins but the join callback is lost
    pub fn add_participant_silently(&self, id: ParticipantId) {
        let mut participants = self.participants.lock();
        if !participants.contains(&id) {
            participants.push(id);
        }
    }

    pub fn remove_participant(&self, id: ParticipantId) {
        self.participants.lock().retain(|p| *p != id);
        self.emit(SdkCallback::ParticipantsLeft(vec![id]));
    }

    /// The meeting drops out from under the kiosk
    pub fn simulate_disconnect(&self) {
        self.participants.lock().clear();
        self.emit(SdkCallback::MeetingStatus {
            status: MeetingStatus::Failed.code(),
            result: 0,
        });
    }

    pub fn set_fail_initialize(&self, fail: bool) {
        self.fail_initialize.store(fail, Ordering::SeqCst);
    }

    pub fn initialize_calls(&self) -> u32 {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    pub fn last_join(&self) -> Option<JoinRequest> {
        self.last_join.lock().clone()
    }

    pub fn last_share(&self) -> Option<MonitorTarget> {
        self.last_share.lock().as_ref().map(|(monitor, _)| monitor.clone())
    }

    pub fn last_share_settings(&self) -> Option<ScreenConfig> {
        self.last_share.lock().as_ref().map(|(_, settings)| settings.clone())
    }

    pub fn is_attached(&self) -> bool {
        self.callbacks.lock().is_some()
    }
}

impl Default for MockMeetingSdk {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeetingSdk for MockMeetingSdk {
    async fn initialize(&self, callbacks: CallbackSender, jwt: &str) -> MeetingResult<()> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(MeetingError::Unavailable("mock SDK refused to initialize".to_string()));
        }

        tracing::info!("[MOCK] SDK initialized");
        let preview: String = jwt.chars().take(20).collect();
        tracing::debug!("[MOCK] Authenticating with JWT: {}...", preview);

        *self.callbacks.lock() = Some(callbacks);
        self.emit_after(self.timing.auth, SdkCallback::AuthResult(AUTH_SUCCESS));
        Ok(())
    }

    async fn join_meeting(&self, request: JoinRequest) -> MeetingResult<()> {
        if !self.is_attached() {
            return Err(MeetingError::NotInitialized);
        }
        tracing::info!("[MOCK] Joining meeting {}", request.meeting_number);
        *self.last_join.lock() = Some(request);
        self.add_participant_silently(MOCK_SELF_ID);

        self.emit(SdkCallback::MeetingStatus {
            status: MeetingStatus::Connecting.code(),
            result: 0,
        });
        self.emit_after(
            self.timing.join,
            SdkCallback::MeetingStatus {
                status: MeetingStatus::InMeeting.code(),
                result: 0,
            },
        );
        Ok(())
    }

    async fn start_monitor_share(&self, monitor: MonitorTarget, settings: &ScreenConfig) -> MeetingResult<()> {
        if settings.share_computer_sound {
            tracing::info!("[MOCK] Share computer sound: true");
        }
        if settings.stereo_audio {
            tracing::info!("[MOCK] Stereo audio: true");
        }
        if settings.optimize_for_video {
            tracing::info!("[MOCK] Optimize for video: true");
        }
        tracing::info!("[MOCK] Starting monitor share: {:?}", monitor);
        *self.last_share.lock() = Some((monitor, settings.clone()));
        self.emit_after(self.timing.share, SdkCallback::ShareStatus(1));
        Ok(())
    }

    async fn stop_share(&self) -> MeetingResult<()> {
        self.emit(SdkCallback::ShareStatus(0));
        Ok(())
    }

    async fn enable_remote_control(&self, settings: &RemoteControlConfig) -> MeetingResult<()> {
        tracing::info!("[MOCK] Auto accept remote control: {}", settings.auto_accept);
        if settings.enable_clipboard {
            tracing::info!("[MOCK] Clipboard share: true");
        }
        tokio::time::sleep(self.timing.remote_control).await;
        Ok(())
    }

    async fn leave_meeting(&self) -> MeetingResult<()> {
        self.participants.lock().clear();
        self.emit(SdkCallback::MeetingStatus {
            status: MeetingStatus::Ended.code(),
            result: 0,
        });
        Ok(())
    }

    async fn cleanup(&self) -> MeetingResult<()> {
        *self.callbacks.lock() = None;
        self.participants.lock().clear();
        tracing::info!("[MOCK] SDK cleaned up");
        Ok(())
    }

    fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.lock().clone()
    }

    fn is_myself(&self, id: ParticipantId) -> bool {
        id == MOCK_SELF_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_join_sequence() {
        let sdk = MockMeetingSdk::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        sdk.initialize(tx, "token").await.unwrap();
        assert_eq!(rx.recv().await, Some(SdkCallback::AuthResult(AUTH_SUCCESS)));

        sdk.join_meeting(JoinRequest {
            meeting_number: 42,
            display_name: "kiosk".into(),
            passcode: String::new(),
            direct_share_desktop: true,
            video_off: false,
            audio_off: false,
        })
        .await
        .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(SdkCallback::MeetingStatus { status: 1, result: 0 })
        );
        assert_eq!(
            rx.recv().await,
            Some(SdkCallback::MeetingStatus { status: 3, result: 0 })
        );
        assert_eq!(sdk.participant_ids(), vec![MOCK_SELF_ID]);
    }

    #[tokio::test]
    async fn test_cleanup_detaches_callbacks() {
        let sdk = MockMeetingSdk::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        sdk.initialize(tx, "token").await.unwrap();
        sdk.cleanup().await.unwrap();

        sdk.emit(SdkCallback::IdentityExpired);
        assert!(!sdk.is_attached());
        // The only live sender was the pending auth task
        assert_ne!(rx.try_recv().ok(), Some(SdkCallback::IdentityExpired));
    }

    #[tokio::test]
    async fn test_initialize_failure_is_scriptable() {
        let sdk = MockMeetingSdk::new();
        sdk.set_fail_initialize(true);
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(sdk.initialize(tx, "token").await.is_err());
        assert_eq!(sdk.initialize_calls(), 1);
    }
}
