//! Replay of recorded preferences through the system pointer

pub mod player;

pub use player::{ActionPlayer, PlaybackError, PlaybackResult};
