use crate::capture::input::detector::ClickDetector;
use crate::capture::input::types::RawButtonEvent;
use crate::recorder::channel::{RecordingError, RecordingResult};
use crate::recorder::session::ActionRecorder;
use parking_lot::Mutex as ParkingMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(target_os = "macos")]
use crate::capture::macos::input as platform;

#[cfg(target_os = "windows")]
use crate::capture::windows::input as platform;

/// Callback the platform polling thread hands each button transition to
pub type ButtonSink = Arc<dyn Fn(RawButtonEvent) + Send + Sync>;

/// Interval between button state samples
pub const POLL_INTERVAL: Duration = Duration::from_millis(8);

/// Feeds global mouse clicks into an [`ActionRecorder`] while capturing.
pub struct ClickCaptureChannel {
    is_capturing: Arc<AtomicBool>,
    detector: Arc<ParkingMutex<ClickDetector>>,
    thread_handle: ParkingMutex<Option<std::thread::JoinHandle<()>>>,
}

impl ClickCaptureChannel {
    pub fn new() -> Self {
        Self {
            is_capturing: Arc::new(AtomicBool::new(false)),
            detector: Arc::new(ParkingMutex::new(ClickDetector::new())),
            thread_handle: ParkingMutex::new(None),
        }
    }

    /// Build the sink that routes raw transitions through the detector
    pub fn sink_for(&self, recorder: Arc<ActionRecorder>) -> ButtonSink {
        let detector = self.detector.clone();
        Arc::new(move |event: RawButtonEvent| {
            if !recorder.is_recording() {
                return;
            }
            if let Some(click) = detector.lock().feed(&event) {
                recorder.record_click(click.x, click.y, click.button, click.kind);
            }
        })
    }

    pub fn start(&self, recorder: Arc<ActionRecorder>) -> RecordingResult<()> {
        if self.is_capturing.load(Ordering::SeqCst) {
            return Err(RecordingError::AlreadyRecording);
        }

        self.detector.lock().reset();
        self.is_capturing.store(true, Ordering::SeqCst);

        let sink = self.sink_for(recorder);
        let handle = match start_platform_tracking(
            self.is_capturing.clone(),
            sink,
            Instant::now(),
            POLL_INTERVAL,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                self.is_capturing.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        *self.thread_handle.lock() = Some(handle);
        tracing::info!("Click capture started");
        Ok(())
    }

    pub fn stop(&self) {
        if !self.is_capturing.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.thread_handle.lock().take() {
            let _ = handle.join();
        }
        tracing::info!("Click capture stopped");
    }

    pub fn is_capturing(&self) -> bool {
        self.is_capturing.load(Ordering::SeqCst)
    }
}

impl Default for ClickCaptureChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ClickCaptureChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn start_platform_tracking(
    is_capturing: Arc<AtomicBool>,
    sink: ButtonSink,
    start_time: Instant,
    poll_interval: Duration,
) -> RecordingResult<std::thread::JoinHandle<()>> {
    platform::start_click_tracking(is_capturing, sink, start_time, poll_interval)
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn start_platform_tracking(
    _is_capturing: Arc<AtomicBool>,
    _sink: ButtonSink,
    _start_time: Instant,
    _poll_interval: Duration,
) -> RecordingResult<std::thread::JoinHandle<()>> {
    Err(RecordingError::PlatformError(
        "Global click capture is not supported on this platform".to_string(),
    ))
}
