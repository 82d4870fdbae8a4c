//! Win32 pointer backend

use crate::automation::{AutomationError, AutomationResult, DisplayBounds, Point, PointerControl};
use crate::capture::input::types::MouseButton;
use parking_lot::Mutex as ParkingMutex;
use std::time::Duration;
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEINPUT, MOUSE_EVENT_FLAGS, MOUSEEVENTF_LEFTDOWN,
    MOUSEEVENTF_LEFTUP, MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP, MOUSEEVENTF_RIGHTDOWN,
    MOUSEEVENTF_RIGHTUP,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetSystemMetrics, SetCursorPos, SM_CXSCREEN, SM_CYSCREEN,
};

pub struct Win32Pointer {
    mouse_delay: ParkingMutex<Duration>,
}

impl Win32Pointer {
    pub fn new() -> Self {
        Self {
            mouse_delay: ParkingMutex::new(Duration::ZERO),
        }
    }
}

impl Default for Win32Pointer {
    fn default() -> Self {
        Self::new()
    }
}

fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl PointerControl for Win32Pointer {
    fn move_to(&self, x: i32, y: i32) -> AutomationResult<()> {
        unsafe { SetCursorPos(x, y) }
            .map_err(|e| AutomationError::Failed(format!("SetCursorPos failed: {}", e)))
    }

    fn position(&self) -> AutomationResult<Point> {
        let mut pos = POINT::default();
        unsafe { GetCursorPos(&mut pos) }
            .map_err(|e| AutomationError::Failed(format!("GetCursorPos failed: {}", e)))?;
        Ok(Point::new(pos.x, pos.y))
    }

    fn click(&self, button: MouseButton) -> AutomationResult<()> {
        let (down, up) = match button {
            MouseButton::Left => (MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP),
            MouseButton::Right => (MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP),
            MouseButton::Middle => (MOUSEEVENTF_MIDDLEDOWN, MOUSEEVENTF_MIDDLEUP),
        };
        let inputs = [mouse_input(down), mouse_input(up)];
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(AutomationError::Failed(format!(
                "SendInput delivered {} of {} events",
                sent,
                inputs.len()
            )));
        }
        Ok(())
    }

    fn set_mouse_delay(&self, delay: Duration) {
        *self.mouse_delay.lock() = delay;
    }

    fn mouse_delay(&self) -> Duration {
        *self.mouse_delay.lock()
    }

    fn primary_display(&self) -> Option<DisplayBounds> {
        let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
        let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(DisplayBounds {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
        })
    }
}
