use serde::{Deserialize, Serialize};
use std::fmt;

/// Mouse button used for a recorded or replayed click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a raw hook button code to a button.
    ///
    /// Hooks disagree on numbering, so both 0 and 1 mean left and both 3 and 4
    /// mean middle. Anything unknown is treated as left.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 | 1 => MouseButton::Left,
            2 => MouseButton::Right,
            3 | 4 => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

/// Kind of a recorded action.
///
/// `Move` only exists so that recordings made by older builds still parse;
/// it is dropped when a recording is finalized and ignored during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Click,
    #[serde(rename = "doubleclick")]
    DoubleClick,
}

impl ActionKind {
    pub fn is_click(&self) -> bool {
        matches!(self, ActionKind::Click | ActionKind::DoubleClick)
    }
}

/// A single recorded mouse action.
///
/// `time` is the offset in milliseconds from the start of the recording,
/// not a wall-clock timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseAction {
    pub x: i32,
    pub y: i32,
    pub time: u64,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
}

impl MouseAction {
    pub fn click(x: i32, y: i32, time: u64, button: MouseButton) -> Self {
        Self {
            x,
            y,
            time,
            kind: ActionKind::Click,
            button: Some(button),
        }
    }

    pub fn double_click(x: i32, y: i32, time: u64, button: MouseButton) -> Self {
        Self {
            x,
            y,
            time,
            kind: ActionKind::DoubleClick,
            button: Some(button),
        }
    }

    /// Button to press, defaulting to left for recordings without one
    pub fn button_or_default(&self) -> MouseButton {
        self.button.unwrap_or_default()
    }
}

/// A raw button transition sampled from the platform hook
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawButtonEvent {
    pub x: i32,
    pub y: i32,
    pub button_code: u32,
    pub pressed: bool,
    pub process_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_code_mapping() {
        assert_eq!(MouseButton::from_code(0), MouseButton::Left);
        assert_eq!(MouseButton::from_code(1), MouseButton::Left);
        assert_eq!(MouseButton::from_code(2), MouseButton::Right);
        assert_eq!(MouseButton::from_code(3), MouseButton::Middle);
        assert_eq!(MouseButton::from_code(4), MouseButton::Middle);
        assert_eq!(MouseButton::from_code(42), MouseButton::Left);
    }

    #[test]
    fn test_action_json_shape() {
        let action = MouseAction::double_click(10, 20, 1500, MouseButton::Right);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"x": 10, "y": 20, "time": 1500, "type": "doubleclick", "button": "right"})
        );
    }

    #[test]
    fn test_legacy_move_without_button_parses() {
        let action: MouseAction =
            serde_json::from_str(r#"{"x": 1, "y": 2, "time": 3, "type": "move"}"#).unwrap();
        assert_eq!(action.kind, ActionKind::Move);
        assert!(!action.kind.is_click());
        assert_eq!(action.button_or_default(), MouseButton::Left);
    }
}
