//! Platform-specific input capture
//!
//! This module provides global click capture for each platform.

pub mod input;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

pub use input::ClickCaptureChannel;
