//! Persisted recording file
//!
//! A recording is stored as a pretty-printed JSON array of [`MouseAction`]
//! at a fixed path. A missing or unreadable file means "no recording".

use crate::capture::input::types::MouseAction;
use crate::recorder::channel::RecordingResult;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RecordingStore {
    path: PathBuf,
}

impl RecordingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_recording(&self) -> bool {
        self.path.exists()
    }

    /// Load the recorded actions.
    ///
    /// Returns `None` when the file is missing or malformed; the caller treats
    /// both as "no preferences recorded yet".
    pub fn load_recording(&self) -> Option<Vec<MouseAction>> {
        if !self.has_recording() {
            return None;
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read recording {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<MouseAction>>(&content) {
            Ok(actions) => Some(actions),
            Err(e) => {
                tracing::warn!("Ignoring malformed recording {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save_recording(&self, actions: &[MouseAction]) -> RecordingResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(actions)?;
        std::fs::write(&self.path, data)?;
        tracing::info!("Saved {} actions to {}", actions.len(), self.path.display());
        Ok(())
    }

    pub fn delete_recording(&self) -> RecordingResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::input::types::MouseButton;

    #[test]
    fn test_missing_file_is_no_recording() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path().join("user-prefs.json"));
        assert!(!store.has_recording());
        assert!(store.load_recording().is_none());
    }

    #[test]
    fn test_malformed_file_is_no_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user-prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = RecordingStore::new(&path);
        assert!(store.has_recording());
        assert!(store.load_recording().is_none());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path().join("nested").join("user-prefs.json"));
        let actions = vec![
            MouseAction::click(100, 200, 500, MouseButton::Left),
            MouseAction::double_click(300, 40, 1200, MouseButton::Right),
        ];

        store.save_recording(&actions).unwrap();
        assert_eq!(store.load_recording(), Some(actions));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path().join("user-prefs.json"));
        store.save_recording(&[]).unwrap();

        store.delete_recording().unwrap();
        assert!(!store.has_recording());
        store.delete_recording().unwrap();
    }
}
