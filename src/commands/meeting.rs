//! Meeting and kiosk status commands

use crate::config::KioskConfig;
use crate::kiosk::{KioskApp, KioskStatus};

const REDACTED: &str = "********";

pub fn get_status(app: &KioskApp) -> Result<KioskStatus, String> {
    Ok(app.snapshot())
}

/// Active configuration with the SDK secret masked
pub fn get_config(app: &KioskApp) -> Result<KioskConfig, String> {
    let mut config = app.config().clone();
    if !config.zoom.sdk_secret.is_empty() {
        config.zoom.sdk_secret = REDACTED.to_string();
    }
    if !config.zoom.passcode.is_empty() {
        config.zoom.passcode = REDACTED.to_string();
    }
    Ok(config)
}

/// Manual reconnect, also the way out of the watchdog's failed state
pub async fn reconnect(app: &KioskApp) -> Result<String, String> {
    app.watchdog().reset();
    app.reconnect().await.map_err(|e| format!("{:#}", e))?;
    Ok("Reconnect started".to_string())
}
