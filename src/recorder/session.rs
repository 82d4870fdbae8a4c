//! Action recorder
//!
//! Collects timestamped clicks between start and stop, then filters and
//! persists them through the [`RecordingStore`].

use crate::capture::input::types::{ActionKind, MouseAction, MouseButton};
use crate::recorder::channel::RecordingResult;
use crate::recorder::store::RecordingStore;
use parking_lot::Mutex as ParkingMutex;
use serde::Serialize;
use std::time::Instant;

/// Transient state of an in-progress capture
#[derive(Debug)]
pub struct RecordingSession {
    started_at: Instant,
    actions: Vec<MouseAction>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            actions: Vec::new(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    pub fn push(&mut self, action: MouseAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Consume the session, keeping only click and double-click actions
    pub fn finalize(self) -> Vec<MouseAction> {
        self.actions
            .into_iter()
            .filter(|action| action.kind.is_click())
            .collect()
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderStatus {
    pub is_recording: bool,
    pub action_count: usize,
}

pub struct ActionRecorder {
    store: RecordingStore,
    session: ParkingMutex<Option<RecordingSession>>,
}

impl ActionRecorder {
    pub fn new(store: RecordingStore) -> Self {
        Self {
            store,
            session: ParkingMutex::new(None),
        }
    }

    pub fn store(&self) -> &RecordingStore {
        &self.store
    }

    pub fn is_recording(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Begin a new capture. Does nothing if one is already running.
    pub fn start_recording(&self) {
        let mut session = self.session.lock();
        if session.is_some() {
            return;
        }
        *session = Some(RecordingSession::new());
        tracing::info!("Recording started");
    }

    /// Record a click relative to the start of the capture
    pub fn record_click(&self, x: i32, y: i32, button: MouseButton, kind: ActionKind) {
        let mut guard = self.session.lock();
        let Some(session) = guard.as_mut() else {
            return;
        };

        let action = MouseAction {
            x,
            y,
            time: session.elapsed_ms(),
            kind,
            button: Some(button),
        };
        tracing::debug!(?action, "Captured click");
        session.push(action);
    }

    /// Append an already-timed action to the running capture
    pub fn push_action(&self, action: MouseAction) {
        if let Some(session) = self.session.lock().as_mut() {
            session.push(action);
        }
    }

    /// Finish the capture and persist it.
    ///
    /// Returns `Ok(None)` when no capture was running, otherwise the number of
    /// actions written after dropping non-click entries.
    pub fn stop_recording(&self) -> RecordingResult<Option<usize>> {
        let Some(session) = self.session.lock().take() else {
            return Ok(None);
        };

        let actions = session.finalize();
        self.store.save_recording(&actions)?;
        tracing::info!("Recording stopped ({} actions)", actions.len());
        Ok(Some(actions.len()))
    }

    pub fn status(&self) -> RecorderStatus {
        let session = self.session.lock();
        RecorderStatus {
            is_recording: session.is_some(),
            action_count: session.as_ref().map(RecordingSession::len).unwrap_or(0),
        }
    }

    pub fn has_recording(&self) -> bool {
        self.store.has_recording()
    }

    pub fn load_recording(&self) -> Option<Vec<MouseAction>> {
        self.store.load_recording()
    }

    pub fn delete_recording(&self) -> RecordingResult<()> {
        self.store.delete_recording()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (tempfile::TempDir, ActionRecorder) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path().join("user-prefs.json"));
        (dir, ActionRecorder::new(store))
    }

    #[test]
    fn test_clicks_ignored_when_not_recording() {
        let (_dir, recorder) = recorder();
        recorder.record_click(1, 2, MouseButton::Left, ActionKind::Click);
        assert_eq!(recorder.status().action_count, 0);
        assert_eq!(recorder.stop_recording().unwrap(), None);
        assert!(!recorder.has_recording());
    }

    #[test]
    fn test_stop_persists_only_clicks() {
        let (_dir, recorder) = recorder();
        recorder.start_recording();
        recorder.push_action(MouseAction {
            x: 5,
            y: 5,
            time: 10,
            kind: ActionKind::Move,
            button: None,
        });
        recorder.push_action(MouseAction::click(10, 20, 100, MouseButton::Left));
        recorder.push_action(MouseAction::double_click(30, 40, 200, MouseButton::Left));
        assert_eq!(recorder.status().action_count, 3);

        assert_eq!(recorder.stop_recording().unwrap(), Some(2));
        let saved = recorder.load_recording().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|a| a.kind.is_click()));
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_start_twice_keeps_existing_session() {
        let (_dir, recorder) = recorder();
        recorder.start_recording();
        recorder.record_click(1, 1, MouseButton::Right, ActionKind::Click);
        recorder.start_recording();
        assert_eq!(recorder.status().action_count, 1);
    }

    #[test]
    fn test_recorded_time_is_relative_offset() {
        let (_dir, recorder) = recorder();
        recorder.start_recording();
        recorder.record_click(1, 1, MouseButton::Left, ActionKind::Click);
        recorder.stop_recording().unwrap();

        let saved = recorder.load_recording().unwrap();
        // An offset from start, not a unix timestamp
        assert!(saved[0].time < 5_000);
    }
}
