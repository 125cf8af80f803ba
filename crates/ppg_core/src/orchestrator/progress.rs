//! Progress observer - stores the current stage state for a run.

use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{ProgressCallback, ProgressEvent};

#[derive(Default)]
struct TrackerState {
    current: Option<ProgressEvent>,
    history: Vec<ProgressEvent>,
}

/// Consumes progress events and keeps the latest stage state.
///
/// Indices must strictly increase within a run; stale or duplicate
/// events (e.g. from a superseded run whose last emission raced the
/// handoff) are dropped rather than allowed to regress the display.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback feeding this tracker, for `RunContext`.
    pub fn callback(&self) -> ProgressCallback {
        let state = Arc::clone(&self.state);
        Box::new(move |event: &ProgressEvent| {
            let mut guard = state.lock();
            if let Some(ref current) = guard.current {
                if event.index <= current.index {
                    return;
                }
            }
            guard.current = Some(event.clone());
            guard.history.push(event.clone());
        })
    }

    /// The most recent event, if any.
    pub fn current(&self) -> Option<ProgressEvent> {
        self.state.lock().current.clone()
    }

    /// All accepted events, in order.
    pub fn history(&self) -> Vec<ProgressEvent> {
        self.state.lock().history.clone()
    }

    /// Whether the completion event has been observed.
    pub fn is_complete(&self) -> bool {
        self.state
            .lock()
            .current
            .as_ref()
            .is_some_and(|event| event.is_complete())
    }
}
