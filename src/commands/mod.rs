//! Operator command handlers
//!
//! The kiosk has no window; the hotkeys and tray actions of a desktop kiosk
//! are exposed as line commands. Handlers return `Result<_, String>` so the
//! error text can go straight back to the operator.

pub mod meeting;
pub mod recording;

use crate::kiosk::KioskApp;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskCommand {
    ToggleRecording,
    StopRecording,
    ClearRecording,
    Reconnect,
    Status,
    Config,
    Help,
    Quit,
}

impl FromStr for KioskCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle-recording" | "f9" => Ok(KioskCommand::ToggleRecording),
            "stop-recording" | "f10" => Ok(KioskCommand::StopRecording),
            "clear-recording" => Ok(KioskCommand::ClearRecording),
            "reconnect" => Ok(KioskCommand::Reconnect),
            "status" => Ok(KioskCommand::Status),
            "config" => Ok(KioskCommand::Config),
            "help" | "?" => Ok(KioskCommand::Help),
            "quit" | "exit" => Ok(KioskCommand::Quit),
            other => Err(format!("Unknown command: {:?} (try \"help\")", other)),
        }
    }
}

impl fmt::Display for KioskCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KioskCommand::ToggleRecording => "toggle-recording",
            KioskCommand::StopRecording => "stop-recording",
            KioskCommand::ClearRecording => "clear-recording",
            KioskCommand::Reconnect => "reconnect",
            KioskCommand::Status => "status",
            KioskCommand::Config => "config",
            KioskCommand::Help => "help",
            KioskCommand::Quit => "quit",
        };
        f.write_str(name)
    }
}

pub const HELP: &str = "\
Commands:
  toggle-recording (F9)   start/stop capturing preferences
  stop-recording   (F10)  force stop capturing
  clear-recording         delete saved preferences
  reconnect               tear down and rejoin the meeting
  status                  show kiosk status
  config                  show active configuration
  quit                    leave the meeting and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    Quit,
}

pub async fn dispatch(app: &KioskApp, command: KioskCommand) -> Result<CommandOutcome, String> {
    let reply = match command {
        KioskCommand::ToggleRecording => recording::toggle_recording(app)?,
        KioskCommand::StopRecording => recording::stop_recording(app)?,
        KioskCommand::ClearRecording => recording::clear_recording(app)?,
        KioskCommand::Reconnect => meeting::reconnect(app).await?,
        KioskCommand::Status => {
            let status = meeting::get_status(app)?;
            serde_json::to_string_pretty(&status).map_err(|e| e.to_string())?
        }
        KioskCommand::Config => {
            let config = meeting::get_config(app)?;
            serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?
        }
        KioskCommand::Help => HELP.to_string(),
        KioskCommand::Quit => return Ok(CommandOutcome::Quit),
    };
    Ok(CommandOutcome::Reply(reply))
}
