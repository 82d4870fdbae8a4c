//! Global click capture
//!
//! Samples the platform's mouse button state on a background thread and turns
//! transitions into click / double-click records for the preference recorder.

pub mod channel;
pub mod detector;
pub mod types;

pub use channel::{ButtonSink, ClickCaptureChannel};
pub use detector::{ClickDetector, DetectedClick};
pub use types::{ActionKind, MouseAction, MouseButton, RawButtonEvent};
