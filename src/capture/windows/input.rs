use crate::capture::input::channel::ButtonSink;
use crate::capture::input::types::RawButtonEvent;
use crate::recorder::channel::{RecordingError, RecordingResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, VIRTUAL_KEY, VK_LBUTTON, VK_MBUTTON, VK_RBUTTON,
};
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

const BUTTONS: [(VIRTUAL_KEY, u32); 3] = [(VK_LBUTTON, 0), (VK_RBUTTON, 2), (VK_MBUTTON, 3)];

fn is_down(key: VIRTUAL_KEY) -> bool {
    // High bit set means the key is currently held
    (unsafe { GetAsyncKeyState(key.0 as i32) } as u16 & 0x8000) != 0
}

/// Start click tracking thread (Windows)
///
/// Polls `GetAsyncKeyState` for the three mouse buttons and reports every
/// transition to `sink` together with the cursor position.
pub fn start_click_tracking(
    is_capturing: Arc<AtomicBool>,
    sink: ButtonSink,
    start_time: Instant,
    poll_interval: Duration,
) -> RecordingResult<std::thread::JoinHandle<()>> {
    let mut probe = POINT::default();
    unsafe { GetCursorPos(&mut probe) }
        .map_err(|e| RecordingError::PlatformError(format!("GetCursorPos failed: {}", e)))?;

    let handle = std::thread::spawn(move || {
        tracing::info!(
            "Windows click tracking started (poll_interval={:?})",
            poll_interval
        );

        let mut last_state = [false; 3];

        while is_capturing.load(Ordering::Relaxed) {
            let loop_start = Instant::now();

            for (i, (key, code)) in BUTTONS.iter().enumerate() {
                let down = is_down(*key);
                if down == last_state[i] {
                    continue;
                }
                last_state[i] = down;

                let mut pos = POINT::default();
                if unsafe { GetCursorPos(&mut pos) }.is_err() {
                    continue;
                }
                sink(RawButtonEvent {
                    x: pos.x,
                    y: pos.y,
                    button_code: *code,
                    pressed: down,
                    process_time_ms: start_time.elapsed().as_secs_f64() * 1000.0,
                });
            }

            let elapsed = loop_start.elapsed();
            if elapsed < poll_interval {
                std::thread::sleep(poll_interval - elapsed);
            }
        }

        tracing::info!("Windows click tracking thread stopped");
    });

    Ok(handle)
}
