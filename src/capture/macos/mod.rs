//! macOS capture implementations
//!
//! Uses AppKit's `NSEvent` class methods to sample global mouse state.

pub mod input;

pub use input::*;
