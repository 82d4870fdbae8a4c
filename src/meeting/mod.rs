//! Meeting SDK integration
//!
//! - `sdk`: the vendor seam and raw callback type
//! - `lifecycle`: maps callbacks to semantic events and drives join/share
//! - `events`: broadcast bus those events fan out on
//! - `auth`: JWT for SDK authentication
//! - `mock`: in-process SDK used when no vendor SDK is linked

pub mod auth;
pub mod events;
pub mod lifecycle;
pub mod mock;
pub mod sdk;
pub mod types;

pub use events::EventBus;
pub use lifecycle::MeetingLifecycle;
pub use mock::MockMeetingSdk;
pub use sdk::{MeetingError, MeetingResult, MeetingSdk, MonitorTarget, SdkCallback};
pub use types::{MeetingEvent, MeetingStatus, ShareStatus};
