//! Raw button transitions to recorded clicks

use crate::capture::input::types::{ActionKind, MouseButton, RawButtonEvent};

/// Two releases closer together than this count as a double click
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 500.0;

/// ... and they must also land within this many pixels of each other
pub const DOUBLE_CLICK_RADIUS_PX: f64 = 5.0;

/// A click the detector wants recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedClick {
    pub x: i32,
    pub y: i32,
    pub button: MouseButton,
    pub kind: ActionKind,
}

/// Turns button down/up transitions into click and double-click records.
///
/// Every press is a click. A release that follows the previous release
/// closely in time and space additionally yields a double click.
#[derive(Debug, Default)]
pub struct ClickDetector {
    last_release: Option<(f64, i32, i32)>,
}

impl ClickDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: &RawButtonEvent) -> Option<DetectedClick> {
        if event.pressed {
            return Some(DetectedClick {
                x: event.x,
                y: event.y,
                button: MouseButton::from_code(event.button_code),
                kind: ActionKind::Click,
            });
        }

        if let Some((t, x, y)) = self.last_release {
            let dt = event.process_time_ms - t;
            let dx = (event.x - x) as f64;
            let dy = (event.y - y) as f64;
            if dt < DOUBLE_CLICK_WINDOW_MS && dx.hypot(dy) < DOUBLE_CLICK_RADIUS_PX {
                self.last_release = None;
                return Some(DetectedClick {
                    x: event.x,
                    y: event.y,
                    button: MouseButton::Left,
                    kind: ActionKind::DoubleClick,
                });
            }
        }

        self.last_release = Some((event.process_time_ms, event.x, event.y));
        None
    }

    pub fn reset(&mut self) {
        self.last_release = None;
    }
}
