//! Windows capture implementations
//!
//! Uses `GetAsyncKeyState` polling for global click capture.

pub mod input;

pub use input::*;
