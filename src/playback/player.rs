//! Preference replay
//!
//! Replays recorded clicks in time order. Before every click the pointer
//! travels from wherever it is through the screen center and the top toolbar
//! waypoint to the target, each hop synthesized by [`Trajectory`].

use crate::automation::{
    AutomationError, AutomationResult, Point, PointerControl, PointerLoader, ScreenWaypoints,
};
use crate::capture::input::types::{ActionKind, MouseAction, MouseButton};
use crate::processing::wind_mouse::{Trajectory, TrajectoryError, WindMouseConfig};
use parking_lot::Mutex as ParkingMutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Longest single sleep while waiting between actions, so `stop` is
/// observed promptly
pub const WAIT_CHUNK: Duration = Duration::from_millis(50);

pub const MIN_PLAYBACK_SPEED: f64 = 0.1;
pub const MAX_PLAYBACK_SPEED: f64 = 5.0;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Clears the active playback slot when a replay ends, however it ends
struct ActiveGuard<'a> {
    slot: &'a ParkingMutex<Option<CancellationToken>>,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}

pub struct ActionPlayer {
    loader: PointerLoader,
    pointer: ParkingMutex<Option<Arc<dyn PointerControl>>>,
    motion: WindMouseConfig,
    playback_speed: ParkingMutex<f64>,
    active: ParkingMutex<Option<CancellationToken>>,
}

impl ActionPlayer {
    /// Create a player that loads its pointer backend on first replay
    pub fn new(loader: PointerLoader) -> Self {
        Self {
            loader,
            pointer: ParkingMutex::new(None),
            motion: WindMouseConfig::default(),
            playback_speed: ParkingMutex::new(1.0),
            active: ParkingMutex::new(None),
        }
    }

    /// Create a player around an already-loaded pointer
    pub fn with_pointer(pointer: Arc<dyn PointerControl>) -> Self {
        let player = Self::new(Arc::new({
            let pointer = pointer.clone();
            move || -> AutomationResult<Arc<dyn PointerControl>> { Ok(pointer.clone()) }
        }));
        *player.pointer.lock() = Some(pointer);
        player
    }

    pub fn with_motion(mut self, motion: WindMouseConfig) -> Self {
        self.motion = motion;
        self
    }

    fn ensure_pointer(&self) -> PlaybackResult<Arc<dyn PointerControl>> {
        let mut slot = self.pointer.lock();
        if let Some(pointer) = slot.as_ref() {
            return Ok(pointer.clone());
        }
        let pointer = (self.loader)()?;
        *slot = Some(pointer.clone());
        Ok(pointer)
    }

    pub fn is_playing(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Ask a running replay to stop at its next checkpoint
    pub fn stop(&self) {
        if let Some(token) = self.active.lock().as_ref() {
            tracing::info!("Stopping preference replay");
            token.cancel();
        }
    }

    pub fn playback_speed(&self) -> f64 {
        *self.playback_speed.lock()
    }

    /// Set the inter-action wait multiplier, clamped to [0.1, 5.0]
    pub fn set_playback_speed(&self, speed: f64) {
        let clamped = if speed.is_nan() {
            1.0
        } else {
            speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED)
        };
        *self.playback_speed.lock() = clamped;
    }

    /// Replay the click actions of a recording.
    ///
    /// The replay stops at its next checkpoint when either `cancel` or
    /// [`ActionPlayer::stop`] fires. Returns immediately without error when a
    /// replay is already running or the list is empty. Pointer failures abort
    /// the replay and are returned.
    pub async fn play_actions(
        &self,
        actions: &[MouseAction],
        cancel: &CancellationToken,
    ) -> PlaybackResult<()> {
        if self.is_playing() {
            tracing::debug!("Replay already in progress, ignoring request");
            return Ok(());
        }
        if actions.is_empty() {
            return Ok(());
        }

        let pointer = self.ensure_pointer()?;

        let token = {
            let mut active = self.active.lock();
            if active.is_some() {
                return Ok(());
            }
            let token = cancel.child_token();
            *active = Some(token.clone());
            token
        };
        let _guard = ActiveGuard { slot: &self.active };

        let mut clicks: Vec<&MouseAction> = actions.iter().filter(|a| a.kind.is_click()).collect();
        if clicks.is_empty() {
            return Ok(());
        }
        clicks.sort_by_key(|a| a.time);

        tracing::info!("Replaying {} recorded clicks", clicks.len());

        let mut rng = StdRng::from_entropy();
        let mut previous_time = 0u64;

        'actions: for action in clicks {
            if token.is_cancelled() {
                break;
            }

            let delay_ms = action.time.saturating_sub(previous_time);
            if delay_ms > 0 {
                let wait = Duration::from_secs_f64(delay_ms as f64 / self.playback_speed() / 1000.0);
                if !wait_cancellable(wait, &token).await {
                    break;
                }
            }

            let waypoints = ScreenWaypoints::resolve(pointer.primary_display());
            let target = Point::new(action.x, action.y);
            let mut current = pointer.position()?;

            for hop in [waypoints.center, waypoints.top_center, target] {
                if current != hop {
                    self.move_along(pointer.as_ref(), current, hop, &mut rng).await?;
                    current = hop;
                }
                if token.is_cancelled() {
                    break 'actions;
                }
            }

            let jitter = Duration::from_millis(rng.gen_range(5..=15));
            tokio::time::sleep(jitter).await;
            if token.is_cancelled() {
                break;
            }

            let button = action.button_or_default();
            tracing::debug!(x = action.x, y = action.y, %button, kind = ?action.kind, "Replaying click");
            match action.kind {
                ActionKind::Click => self.click(pointer.as_ref(), button).await?,
                ActionKind::DoubleClick => {
                    self.click(pointer.as_ref(), button).await?;
                    let gap = Duration::from_millis(rng.gen_range(30..=60));
                    tokio::time::sleep(gap).await;
                    self.click(pointer.as_ref(), button).await?;
                }
                ActionKind::Move => {}
            }

            previous_time = action.time;
        }

        if token.is_cancelled() {
            tracing::info!("Preference replay stopped");
        } else {
            tracing::info!("Preference replay finished");
        }
        Ok(())
    }

    /// Move the pointer from `from` to `to` along a synthesized path
    async fn move_along(
        &self,
        pointer: &dyn PointerControl,
        from: Point,
        to: Point,
        rng: &mut StdRng,
    ) -> PlaybackResult<()> {
        let path = Trajectory::new(
            from.x as f64,
            from.y as f64,
            to.x as f64,
            to.y as f64,
            self.motion,
            rng,
        )?;

        for step in path {
            pointer.move_to(step.x, step.y)?;
            if !step.delay.is_zero() {
                tokio::time::sleep(step.delay).await;
            }
        }
        Ok(())
    }

    async fn click(&self, pointer: &dyn PointerControl, button: MouseButton) -> PlaybackResult<()> {
        pointer.click(button)?;
        let delay = pointer.mouse_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

/// Sleep for `total` in chunks, returning false as soon as `token` is
/// cancelled
async fn wait_cancellable(total: Duration, token: &CancellationToken) -> bool {
    let mut left = total;
    while !left.is_zero() {
        if token.is_cancelled() {
            return false;
        }
        let chunk = left.min(WAIT_CHUNK);
        tokio::time::sleep(chunk).await;
        left -= chunk;
    }
    !token.is_cancelled()
}
