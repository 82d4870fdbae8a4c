use crate::capture::input::channel::ButtonSink;
use crate::capture::input::types::RawButtonEvent;
use crate::recorder::channel::RecordingResult;
use core_graphics::display::CGDisplay;
use objc2_app_kit::NSEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Button bits reported by `pressedMouseButtons`, paired with the hook code
/// each one maps to.
const BUTTONS: [(usize, u32); 3] = [(1, 0), (2, 2), (4, 3)];

/// Start click tracking thread (macOS)
///
/// Polls `NSEvent` for pointer location and pressed buttons at a fixed
/// interval and reports every transition to `sink`.
pub fn start_click_tracking(
    is_capturing: Arc<AtomicBool>,
    sink: ButtonSink,
    start_time: Instant,
    poll_interval: Duration,
) -> RecordingResult<std::thread::JoinHandle<()>> {
    let handle = std::thread::spawn(move || {
        tracing::info!(
            "macOS click tracking started (poll_interval={:?})",
            poll_interval
        );

        let mut last_buttons: usize = 0;

        while is_capturing.load(Ordering::Relaxed) {
            let loop_start = Instant::now();

            let buttons = unsafe { NSEvent::pressedMouseButtons() };
            if buttons != last_buttons {
                // NSEvent reports global coordinates from the bottom-left of
                // the main display; recordings use top-left like CoreGraphics
                let pos = unsafe { NSEvent::mouseLocation() };
                let main_height = CGDisplay::main().bounds().size.height;
                let x = pos.x.round() as i32;
                let y = (main_height - pos.y).round() as i32;

                for (mask, code) in BUTTONS {
                    let was_down = (last_buttons & mask) != 0;
                    let is_down = (buttons & mask) != 0;
                    if was_down != is_down {
                        sink(RawButtonEvent {
                            x,
                            y,
                            button_code: code,
                            pressed: is_down,
                            process_time_ms: start_time.elapsed().as_secs_f64() * 1000.0,
                        });
                    }
                }
                last_buttons = buttons;
            }

            let elapsed = loop_start.elapsed();
            if elapsed < poll_interval {
                std::thread::sleep(poll_interval - elapsed);
            }
        }

        tracing::info!("macOS click tracking thread stopped");
    });

    Ok(handle)
}
