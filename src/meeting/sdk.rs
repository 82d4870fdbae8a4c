//! Seam between the kiosk and the vendor meeting SDK
//!
//! The vendor SDK reports everything through callbacks. Implementations of
//! [`MeetingSdk`] forward those as [`SdkCallback`] values on the channel
//! handed to [`MeetingSdk::initialize`], and the lifecycle adapter consumes
//! them in order on a single task.

use crate::config::{RemoteControlConfig, ScreenConfig};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub type ParticipantId = u32;

/// Raw vendor callback, codes untranslated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCallback {
    AuthResult(i32),
    IdentityExpired,
    MeetingStatus { status: i32, result: i32 },
    ShareStatus(i32),
    ParticipantsJoined(Vec<ParticipantId>),
    ParticipantsLeft(Vec<ParticipantId>),
}

pub type CallbackSender = mpsc::UnboundedSender<SdkCallback>;
pub type CallbackReceiver = mpsc::UnboundedReceiver<SdkCallback>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub meeting_number: u64,
    pub display_name: String,
    pub passcode: String,
    /// Share the desktop directly once joined
    pub direct_share_desktop: bool,
    pub video_off: bool,
    pub audio_off: bool,
}

/// Which monitor to share
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorTarget {
    Primary,
    Device(String),
}

impl MonitorTarget {
    /// Index 0 is the primary monitor; `n > 0` maps to `\\?\DISPLAY{n+1}`
    pub fn from_index(index: u32) -> Self {
        if index == 0 {
            MonitorTarget::Primary
        } else {
            MonitorTarget::Device(format!(r"\\?\DISPLAY{}", index + 1))
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeetingError {
    #[error("SDK not initialized")]
    NotInitialized,

    #[error("Not in meeting or share controller not available")]
    NotInMeeting,

    #[error("Not sharing")]
    NotSharing,

    #[error("Invalid meeting number: {0:?}")]
    InvalidMeetingNumber(String),

    #[error("Failed to generate auth token: {0}")]
    Token(String),

    #[error("{operation} failed with error code: {code}")]
    Sdk { operation: &'static str, code: i32 },

    #[error("Meeting SDK unavailable: {0}")]
    Unavailable(String),
}

pub type MeetingResult<T> = Result<T, MeetingError>;

#[async_trait]
pub trait MeetingSdk: Send + Sync {
    /// Initialize the SDK and start authenticating with `jwt`. The auth
    /// outcome arrives later as [`SdkCallback::AuthResult`].
    async fn initialize(&self, callbacks: CallbackSender, jwt: &str) -> MeetingResult<()>;

    async fn join_meeting(&self, request: JoinRequest) -> MeetingResult<()>;

    /// Share `monitor` with the audio and video options in `settings`
    async fn start_monitor_share(&self, monitor: MonitorTarget, settings: &ScreenConfig) -> MeetingResult<()>;

    async fn stop_share(&self) -> MeetingResult<()>;

    async fn enable_remote_control(&self, settings: &RemoteControlConfig) -> MeetingResult<()>;

    async fn leave_meeting(&self) -> MeetingResult<()>;

    /// Release SDK resources; callbacks stop after this returns
    async fn cleanup(&self) -> MeetingResult<()>;

    fn participant_ids(&self) -> Vec<ParticipantId>;

    fn is_myself(&self, id: ParticipantId) -> bool;
}
