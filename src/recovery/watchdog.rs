use crate::config::RecoveryConfig;
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound of the random jitter added to every backoff, in milliseconds
pub const BACKOFF_JITTER_MS: f64 = 1000.0;

/// Reconnect action invoked when a retry timer fires.
///
/// An `Err` counts as a failed attempt and schedules the next retry. `Ok`
/// only means the attempt was started; the watchdog keeps waiting for
/// [`RecoveryWatchdog::on_connected`].
#[async_trait]
pub trait ReconnectHandler: Send + Sync {
    async fn reconnect(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryState {
    Idle,
    Monitoring,
    Recovering,
    Failed,
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecoveryState::Idle => "idle",
            RecoveryState::Monitoring => "monitoring",
            RecoveryState::Recovering => "recovering",
            RecoveryState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// `min(initial * 2^retry + uniform(0, 1000), max)`
pub fn backoff_for<R: Rng>(config: &RecoveryConfig, retry: u32, rng: &mut R) -> Duration {
    let exponential = config.initial_backoff_ms as f64 * 2f64.powi(retry.min(63) as i32);
    let jitter = rng.gen::<f64>() * BACKOFF_JITTER_MS;
    let ms = (exponential + jitter).min(config.max_backoff_ms as f64);
    Duration::from_secs_f64(ms / 1000.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryStatus {
    pub state: RecoveryState,
    pub retry_count: u32,
    pub max_retries: u32,
}

struct WatchdogState {
    state: RecoveryState,
    retry_count: u32,
    /// Bumped whenever timers are cleared; a timer whose epoch no longer
    /// matches must not act
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

impl WatchdogState {
    fn clear_timers(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared {
    config: RecoveryConfig,
    handler: Arc<dyn ReconnectHandler>,
    inner: ParkingMutex<WatchdogState>,
}

/// Exponential-backoff reconnect supervisor.
///
/// At most one retry timer is outstanding. Every transition that clears
/// timers also invalidates a timer that already fired but has not yet
/// reported its outcome.
#[derive(Clone)]
pub struct RecoveryWatchdog {
    shared: Arc<Shared>,
}

impl RecoveryWatchdog {
    pub fn new(config: RecoveryConfig, handler: Arc<dyn ReconnectHandler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                handler,
                inner: ParkingMutex::new(WatchdogState {
                    state: RecoveryState::Idle,
                    retry_count: 0,
                    epoch: 0,
                    timer: None,
                }),
            }),
        }
    }

    pub fn start(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state = RecoveryState::Monitoring;
        inner.retry_count = 0;
        tracing::info!("[RecoveryWatchdog] Started monitoring");
    }

    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        inner.state = RecoveryState::Idle;
        inner.clear_timers();
        tracing::info!("[RecoveryWatchdog] Stopped");
    }

    /// A disconnect always restarts the backoff schedule from retry 0 when
    /// recovery was already underway or had given up.
    pub fn on_disconnected(&self) {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            RecoveryState::Recovering => {
                tracing::info!(
                    "[RecoveryWatchdog] New disconnect detected during recovery, resetting and starting fresh"
                );
                inner.clear_timers();
                inner.retry_count = 0;
            }
            RecoveryState::Failed => {
                tracing::info!("[RecoveryWatchdog] Reset from failed state, starting new recovery");
                inner.retry_count = 0;
            }
            _ => {}
        }

        tracing::info!("[RecoveryWatchdog] Disconnection detected, starting recovery");
        inner.state = RecoveryState::Recovering;
        schedule_retry(&self.shared, &mut inner);
    }

    pub fn on_connected(&self) {
        let mut inner = self.shared.inner.lock();
        tracing::info!("[RecoveryWatchdog] Connection restored");
        inner.state = RecoveryState::Monitoring;
        inner.retry_count = 0;
        inner.clear_timers();
    }

    pub fn on_sharing_restored(&self) {
        let mut inner = self.shared.inner.lock();
        tracing::info!("[RecoveryWatchdog] Sharing restored, recovery complete");
        inner.state = RecoveryState::Monitoring;
        inner.retry_count = 0;
    }

    /// Clear timers and get ready for a new recovery cycle
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock();
        inner.clear_timers();
        inner.retry_count = 0;
        inner.state = RecoveryState::Monitoring;
        tracing::info!("[RecoveryWatchdog] Reset, ready for new recovery cycle");
    }

    pub fn state(&self) -> RecoveryState {
        self.shared.inner.lock().state
    }

    pub fn retry_count(&self) -> u32 {
        self.shared.inner.lock().retry_count
    }

    /// True once retries are exhausted and an operator has to step in
    pub fn needs_attention(&self) -> bool {
        self.state() == RecoveryState::Failed
    }

    pub fn status(&self) -> RecoveryStatus {
        let inner = self.shared.inner.lock();
        RecoveryStatus {
            state: inner.state,
            retry_count: inner.retry_count,
            max_retries: self.shared.config.max_retries,
        }
    }

    /// Backoff the next retry would use
    pub fn calculate_backoff(&self) -> Duration {
        let retry = self.retry_count();
        backoff_for(&self.shared.config, retry, &mut rand::thread_rng())
    }
}

fn schedule_retry(shared: &Arc<Shared>, inner: &mut WatchdogState) {
    let max_retries = shared.config.max_retries;
    if inner.retry_count >= max_retries {
        tracing::error!("[RecoveryWatchdog] Max retries reached, entering failed state");
        inner.state = RecoveryState::Failed;
        return;
    }

    let backoff = backoff_for(&shared.config, inner.retry_count, &mut rand::thread_rng());
    tracing::info!(
        "[RecoveryWatchdog] Scheduling retry {}/{} in {}ms",
        inner.retry_count + 1,
        max_retries,
        backoff.as_millis()
    );

    if let Some(previous) = inner.timer.take() {
        previous.abort();
    }
    let epoch = inner.epoch;
    let task_shared = shared.clone();
    inner.timer = Some(tokio::spawn(async move {
        tokio::time::sleep(backoff).await;
        attempt_recovery(task_shared, epoch).await;
    }));
}

async fn attempt_recovery(shared: Arc<Shared>, epoch: u64) {
    let attempt = {
        let mut inner = shared.inner.lock();
        if inner.epoch != epoch {
            return;
        }
        // Detach so clearing timers during the reconnect does not abort it
        inner.timer = None;
        inner.retry_count += 1;
        inner.retry_count
    };
    tracing::info!("[RecoveryWatchdog] Attempting recovery (attempt {})", attempt);

    let Err(e) = shared.handler.reconnect().await else {
        return;
    };
    tracing::error!("[RecoveryWatchdog] Recovery attempt failed: {:#}", e);

    let mut inner = shared.inner.lock();
    if inner.epoch != epoch || inner.state != RecoveryState::Recovering {
        return;
    }
    if inner.retry_count < shared.config.max_retries {
        schedule_retry(&shared, &mut inner);
    } else {
        inner.state = RecoveryState::Failed;
        tracing::error!("[RecoveryWatchdog] All recovery attempts exhausted");
    }
}
