//! CoreGraphics pointer backend
//!
//! Posts synthetic `CGEvent`s at the HID tap. Requires the accessibility
//! permission; without it macOS silently drops the events.

use crate::automation::{AutomationError, AutomationResult, DisplayBounds, Point, PointerControl};
use crate::capture::input::types::MouseButton;
use core_graphics::display::CGDisplay;
use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use parking_lot::Mutex as ParkingMutex;
use std::time::Duration;

pub struct CoreGraphicsPointer {
    mouse_delay: ParkingMutex<Duration>,
}

impl CoreGraphicsPointer {
    pub fn new() -> AutomationResult<Self> {
        // Probe once so a broken event source shows up at load time
        source()?;
        Ok(Self {
            mouse_delay: ParkingMutex::new(Duration::ZERO),
        })
    }

    fn post(&self, kind: CGEventType, at: CGPoint, button: CGMouseButton) -> AutomationResult<()> {
        let event = CGEvent::new_mouse_event(source()?, kind, at, button)
            .map_err(|_| AutomationError::Failed("CGEvent::new_mouse_event failed".to_string()))?;
        event.post(CGEventTapLocation::HID);
        Ok(())
    }

    fn current_location(&self) -> AutomationResult<CGPoint> {
        let event = CGEvent::new(source()?)
            .map_err(|_| AutomationError::Failed("CGEvent::new failed".to_string()))?;
        Ok(event.location())
    }
}

fn source() -> AutomationResult<CGEventSource> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
        .map_err(|_| AutomationError::Unavailable)
}

impl PointerControl for CoreGraphicsPointer {
    fn move_to(&self, x: i32, y: i32) -> AutomationResult<()> {
        self.post(
            CGEventType::MouseMoved,
            CGPoint::new(x as f64, y as f64),
            CGMouseButton::Left,
        )
    }

    fn position(&self) -> AutomationResult<Point> {
        let loc = self.current_location()?;
        Ok(Point::new(loc.x.round() as i32, loc.y.round() as i32))
    }

    fn click(&self, button: MouseButton) -> AutomationResult<()> {
        let at = self.current_location()?;
        let (down, up, cg_button) = match button {
            MouseButton::Left => (
                CGEventType::LeftMouseDown,
                CGEventType::LeftMouseUp,
                CGMouseButton::Left,
            ),
            MouseButton::Right => (
                CGEventType::RightMouseDown,
                CGEventType::RightMouseUp,
                CGMouseButton::Right,
            ),
            MouseButton::Middle => (
                CGEventType::OtherMouseDown,
                CGEventType::OtherMouseUp,
                CGMouseButton::Center,
            ),
        };
        self.post(down, at, cg_button)?;
        self.post(up, at, cg_button)
    }

    fn set_mouse_delay(&self, delay: Duration) {
        *self.mouse_delay.lock() = delay;
    }

    fn mouse_delay(&self) -> Duration {
        *self.mouse_delay.lock()
    }

    fn primary_display(&self) -> Option<DisplayBounds> {
        let bounds = CGDisplay::main().bounds();
        if bounds.size.width <= 0.0 || bounds.size.height <= 0.0 {
            return None;
        }
        Some(DisplayBounds {
            x: bounds.origin.x,
            y: bounds.origin.y,
            width: bounds.size.width,
            height: bounds.size.height,
        })
    }
}
