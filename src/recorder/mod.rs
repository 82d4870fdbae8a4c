//! Preference recording
//!
//! Captures the operator's clicks while they walk through the meeting menus
//! and persists them so they can be replayed on every later join.

pub mod channel;
pub mod session;
pub mod store;

pub use channel::{RecordingError, RecordingResult};
pub use session::{ActionRecorder, RecorderStatus, RecordingSession};
pub use store::RecordingStore;
