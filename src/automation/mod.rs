//! Pointer automation
//!
//! The replay engine drives the system pointer through the [`PointerControl`]
//! trait. Platform backends are loaded lazily on first use; a missing backend
//! is reported as [`AutomationError::Unavailable`] so the operator gets one
//! actionable message instead of a platform-specific loader failure.

pub mod display;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

use crate::capture::input::types::MouseButton;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use display::{DisplayBounds, ScreenWaypoints};

/// Delay applied after each primitive click
pub const DEFAULT_MOUSE_DELAY: Duration = Duration::from_millis(2);

pub const UNAVAILABLE_MESSAGE: &str = "Input automation is not available. Rebuild zoom-kiosk for a supported desktop target (Windows or macOS) and grant it input control permission.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    #[error("{}", UNAVAILABLE_MESSAGE)]
    Unavailable,

    #[error("Input automation failed: {0}")]
    Failed(String),
}

/// Result type for pointer primitive calls
pub type AutomationResult<T> = Result<T, AutomationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pointer-control primitive used by the action player
pub trait PointerControl: Send + Sync {
    fn move_to(&self, x: i32, y: i32) -> AutomationResult<()>;

    fn position(&self) -> AutomationResult<Point>;

    /// Press and release `button` at the current position
    fn click(&self, button: MouseButton) -> AutomationResult<()>;

    fn set_mouse_delay(&self, delay: Duration);

    fn mouse_delay(&self) -> Duration;

    /// Bounds of the primary display, if the backend can tell
    fn primary_display(&self) -> Option<DisplayBounds>;
}

/// Factory the player calls the first time it needs the pointer
pub type PointerLoader = Arc<dyn Fn() -> AutomationResult<Arc<dyn PointerControl>> + Send + Sync>;

/// Load the pointer backend for the current platform
pub fn load_pointer_control() -> AutomationResult<Arc<dyn PointerControl>> {
    let pointer = load_platform_pointer()?;
    pointer.set_mouse_delay(DEFAULT_MOUSE_DELAY);
    tracing::info!("Pointer automation backend loaded");
    Ok(pointer)
}

/// Loader that resolves the platform backend on demand
pub fn platform_loader() -> PointerLoader {
    Arc::new(load_pointer_control)
}

#[cfg(target_os = "macos")]
fn load_platform_pointer() -> AutomationResult<Arc<dyn PointerControl>> {
    Ok(Arc::new(macos::CoreGraphicsPointer::new()?))
}

#[cfg(target_os = "windows")]
fn load_platform_pointer() -> AutomationResult<Arc<dyn PointerControl>> {
    Ok(Arc::new(windows::Win32Pointer::new()))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn load_platform_pointer() -> AutomationResult<Arc<dyn PointerControl>> {
    tracing::warn!("No pointer automation backend for this platform");
    Err(AutomationError::Unavailable)
}
