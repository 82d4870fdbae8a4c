use serde::Serialize;
use std::fmt;

/// Auth callback result code for success
pub const AUTH_SUCCESS: i32 = 0;

/// Meeting status as reported by the SDK status callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
    Idle,
    Connecting,
    WaitingForHost,
    InMeeting,
    Disconnecting,
    Reconnecting,
    Failed,
    Ended,
    InWaitingRoom,
    Unknown(i32),
}

impl MeetingStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MeetingStatus::Idle,
            1 => MeetingStatus::Connecting,
            2 => MeetingStatus::WaitingForHost,
            3 => MeetingStatus::InMeeting,
            4 => MeetingStatus::Disconnecting,
            5 => MeetingStatus::Reconnecting,
            6 => MeetingStatus::Failed,
            7 => MeetingStatus::Ended,
            11 => MeetingStatus::InWaitingRoom,
            other => MeetingStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            MeetingStatus::Idle => 0,
            MeetingStatus::Connecting => 1,
            MeetingStatus::WaitingForHost => 2,
            MeetingStatus::InMeeting => 3,
            MeetingStatus::Disconnecting => 4,
            MeetingStatus::Reconnecting => 5,
            MeetingStatus::Failed => 6,
            MeetingStatus::Ended => 7,
            MeetingStatus::InWaitingRoom => 11,
            MeetingStatus::Unknown(code) => *code,
        }
    }
}

/// Share status as reported by the SDK sharing callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareStatus {
    Started,
    Stopped,
    Other(i32),
}

impl ShareStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ShareStatus::Started,
            0 | 3 => ShareStatus::Stopped,
            other => ShareStatus::Other(other),
        }
    }
}

/// Semantic lifecycle event published to the rest of the kiosk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum MeetingEvent {
    Initialized,
    MeetingJoined,
    SharingStarted,
    SharingStopped,
    RemoteControlEnabled,
    OtherParticipantPresent,
    Disconnected(String),
    Error(String),
}

impl fmt::Display for MeetingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingEvent::Initialized => write!(f, "initialized"),
            MeetingEvent::MeetingJoined => write!(f, "meetingJoined"),
            MeetingEvent::SharingStarted => write!(f, "sharingStarted"),
            MeetingEvent::SharingStopped => write!(f, "sharingStopped"),
            MeetingEvent::RemoteControlEnabled => write!(f, "remoteControlEnabled"),
            MeetingEvent::OtherParticipantPresent => write!(f, "otherParticipantPresent"),
            MeetingEvent::Disconnected(reason) => write!(f, "disconnected: {}", reason),
            MeetingEvent::Error(message) => write!(f, "error: {}", message),
        }
    }
}
