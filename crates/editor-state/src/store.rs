//! The state container shared by the transport, compositor and UI.

use std::sync::Arc;

use crate::action::{Action, Effect};
use crate::reducer::{reduce, Transition};
use crate::state::EditorState;

/// Owns the current snapshot; the only place state changes.
///
/// Readers hold `Arc` snapshots, so a reader never observes a
/// half-applied transition.
#[derive(Debug, Clone)]
pub struct EditorStore {
    current: Arc<EditorState>,
    revision: u64,
}

impl EditorStore {
    pub fn new(state: EditorState) -> Self {
        Self {
            current: Arc::new(state),
            revision: 0,
        }
    }

    /// Current snapshot, cheap to clone and keep.
    pub fn snapshot(&self) -> Arc<EditorState> {
        Arc::clone(&self.current)
    }

    /// Borrow the current snapshot.
    pub fn state(&self) -> &EditorState {
        &self.current
    }

    /// Number of transitions that changed state so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an action and return the side effects the engine must carry out.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let name = action.name();
        let high_frequency = action.is_high_frequency();

        match reduce(&self.current, action) {
            Transition::Unchanged => {
                tracing::trace!(action = name, "Transition was a no-op");
                vec![]
            }
            Transition::Changed { state, effects } => {
                self.current = Arc::new(state);
                self.revision += 1;
                if high_frequency {
                    tracing::trace!(action = name, revision = self.revision, "State updated");
                } else {
                    tracing::debug!(
                        action = name,
                        revision = self.revision,
                        effects = effects.len(),
                        "State updated"
                    );
                }
                effects
            }
        }
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(EditorState::default())
    }
}
