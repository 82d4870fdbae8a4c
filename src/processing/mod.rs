//! Pointer motion synthesis
//!
//! This module contains the trajectory generator used to move the pointer
//! along natural-looking paths during preference replay.

pub mod wind_mouse;

pub use wind_mouse::{
    PathStep, Trajectory, TrajectoryError, TrajectoryState, WindMouseConfig, MAX_ITERATIONS,
};
