//! Preference capture commands (F9 / F10)

use crate::kiosk::KioskApp;

/// Start capturing, or stop and save if a capture is running
pub fn toggle_recording(app: &KioskApp) -> Result<String, String> {
    if app.recorder().is_recording() {
        return match app.stop_capture().map_err(|e| e.to_string())? {
            Some(count) => {
                let message = format!(
                    "Preferences saved ({} actions) - will apply automatically on next join",
                    count
                );
                app.status_reporter().report(message.clone());
                Ok(message)
            }
            None => Ok("Capture was not running".to_string()),
        };
    }

    app.start_capture().map_err(|e| {
        let message = format!("Failed to start capturing: {}", e);
        app.status_reporter().report(message.clone());
        message
    })?;
    Ok("Capturing started - Press F9 to stop".to_string())
}

/// Force-stop a running capture, saving what was captured
pub fn stop_recording(app: &KioskApp) -> Result<String, String> {
    match app.stop_capture().map_err(|e| e.to_string())? {
        Some(count) => {
            app.status_reporter().report("Capturing stopped");
            Ok(format!("Capturing stopped ({} actions saved)", count))
        }
        None => Ok("Capture was not running".to_string()),
    }
}

/// Forget the saved preferences
pub fn clear_recording(app: &KioskApp) -> Result<String, String> {
    app.recorder()
        .delete_recording()
        .map_err(|e| e.to_string())?;
    Ok("Saved preferences cleared".to_string())
}
