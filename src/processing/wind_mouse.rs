//! WindMouse trajectory synthesis
//!
//! Generates a human-looking pointer path between two points by integrating
//! two forces: a constant pull toward the destination ("gravity") and a
//! randomly fluctuating push ("wind"). Far from the target the wind wanders;
//! inside `target_area` it dies down and the step size shrinks so the pointer
//! settles onto the destination instead of orbiting it.

use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Hard ceiling on integration steps for a single move
pub const MAX_ITERATIONS: usize = 10_000;

/// Base per-step delay in milliseconds, scaled down for fast motion
const BASE_STEP_DELAY_MS: f64 = 1.5;

/// Shortest per-step delay in milliseconds
const MIN_STEP_DELAY_MS: f64 = 0.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("Trajectory endpoints must be finite: ({0}, {1}) -> ({2}, {3})")]
    NonFinite(f64, f64, f64, f64),
}

/// Physical constants of the force model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindMouseConfig {
    /// Magnitude of the pull toward the destination
    pub gravity: f64,
    /// Magnitude of the wind fluctuations
    pub wind: f64,
    /// Maximum step size (velocity clip)
    pub max_step: f64,
    /// Distance below which wind stops gusting and motion is damped
    pub target_area: f64,
}

impl Default for WindMouseConfig {
    fn default() -> Self {
        Self {
            gravity: 9.0,
            wind: 5.0,
            max_step: 15.0,
            target_area: 12.0,
        }
    }
}

/// Integration state for one point-to-point move
#[derive(Debug, Clone)]
pub struct TrajectoryState {
    pub x: f64,
    pub y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub wind_x: f64,
    pub wind_y: f64,
    pub max_step: f64,
}

impl TrajectoryState {
    /// Create a resting state at the given position
    pub fn new(x: f64, y: f64, config: &WindMouseConfig) -> Self {
        Self {
            x,
            y,
            velocity_x: 0.0,
            velocity_y: 0.0,
            wind_x: 0.0,
            wind_y: 0.0,
            max_step: config.max_step,
        }
    }

    pub fn distance_to(&self, dest_x: f64, dest_y: f64) -> f64 {
        (dest_x - self.x).hypot(dest_y - self.y)
    }

    /// Current position rounded to the nearest pixel
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// Advance one integration step toward the destination.
    ///
    /// Returns `None` once the destination is less than one pixel away,
    /// otherwise the velocity magnitude before clipping.
    pub fn step<R: Rng>(
        &mut self,
        dest_x: f64,
        dest_y: f64,
        config: &WindMouseConfig,
        rng: &mut R,
    ) -> Option<f64> {
        let sqrt3 = 3f64.sqrt();
        let sqrt5 = 5f64.sqrt();

        let dist = self.distance_to(dest_x, dest_y);
        if dist < 1.0 {
            return None;
        }

        let wind_mag = config.wind.min(dist);
        if dist >= config.target_area {
            self.wind_x = self.wind_x / sqrt3 + (2.0 * rng.gen::<f64>() - 1.0) * wind_mag / sqrt5;
            self.wind_y = self.wind_y / sqrt3 + (2.0 * rng.gen::<f64>() - 1.0) * wind_mag / sqrt5;
        } else {
            self.wind_x /= sqrt3;
            self.wind_y /= sqrt3;
            if self.max_step < 3.0 {
                self.max_step = rng.gen_range(3.0..6.0);
            } else {
                self.max_step /= sqrt5;
            }
        }

        self.velocity_x += self.wind_x + config.gravity * (dest_x - self.x) / dist;
        self.velocity_y += self.wind_y + config.gravity * (dest_y - self.y) / dist;

        let speed = self.velocity_x.hypot(self.velocity_y);
        if speed > self.max_step {
            let clip = self.max_step / 2.0 + rng.gen::<f64>() * self.max_step / 2.0;
            self.velocity_x = (self.velocity_x / speed) * clip;
            self.velocity_y = (self.velocity_y / speed) * clip;
        }

        self.x += self.velocity_x;
        self.y += self.velocity_y;

        Some(speed)
    }
}

/// One emitted pointer position and the pause to take after moving there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub x: i32,
    pub y: i32,
    pub delay: Duration,
}

/// Pause after a move: faster motion waits less, plus a little jitter
pub fn step_delay<R: Rng>(speed: f64, max_step: f64, rng: &mut R) -> Duration {
    let velocity_factor = if max_step > 0.0 {
        (speed / max_step).min(1.0)
    } else {
        1.0
    };
    let delay_ms = BASE_STEP_DELAY_MS * (1.0 - velocity_factor * 0.3) + rng.gen::<f64>() * 0.2;
    Duration::from_secs_f64(delay_ms.max(MIN_STEP_DELAY_MS) / 1000.0)
}

/// Iterator over the pixel positions of one synthesized move.
///
/// Only positions that differ from the previously emitted pixel are yielded.
/// The last item is always the exact destination with no delay.
#[derive(Debug)]
pub struct Trajectory<R> {
    state: TrajectoryState,
    config: WindMouseConfig,
    dest_x: f64,
    dest_y: f64,
    last_pixel: (i32, i32),
    iterations: usize,
    finished: bool,
    rng: R,
}

impl<R: Rng> Trajectory<R> {
    pub fn new(
        start_x: f64,
        start_y: f64,
        dest_x: f64,
        dest_y: f64,
        config: WindMouseConfig,
        rng: R,
    ) -> Result<Self, TrajectoryError> {
        if ![start_x, start_y, dest_x, dest_y].iter().all(|v| v.is_finite()) {
            return Err(TrajectoryError::NonFinite(start_x, start_y, dest_x, dest_y));
        }

        let state = TrajectoryState::new(start_x, start_y, &config);
        let last_pixel = state.pixel();
        Ok(Self {
            state,
            config,
            dest_x,
            dest_y,
            last_pixel,
            iterations: 0,
            finished: false,
            rng,
        })
    }

    pub fn state(&self) -> &TrajectoryState {
        &self.state
    }

    /// Integration steps taken so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn destination_pixel(&self) -> (i32, i32) {
        (self.dest_x.round() as i32, self.dest_y.round() as i32)
    }
}

impl<R: Rng> Iterator for Trajectory<R> {
    type Item = PathStep;

    fn next(&mut self) -> Option<PathStep> {
        if self.finished {
            return None;
        }

        loop {
            if self.iterations >= MAX_ITERATIONS {
                tracing::warn!(
                    "Trajectory did not converge after {} steps, snapping to destination",
                    MAX_ITERATIONS
                );
                break;
            }

            let Some(speed) =
                self.state
                    .step(self.dest_x, self.dest_y, &self.config, &mut self.rng)
            else {
                break;
            };
            self.iterations += 1;

            let pixel = self.state.pixel();
            if pixel != self.last_pixel {
                self.last_pixel = pixel;
                return Some(PathStep {
                    x: pixel.0,
                    y: pixel.1,
                    delay: step_delay(speed, self.state.max_step, &mut self.rng),
                });
            }
        }

        self.finished = true;
        let (x, y) = self.destination_pixel();
        Some(PathStep {
            x,
            y,
            delay: Duration::ZERO,
        })
    }
}
