//! Bounded undo history of rig operations.
//!
//! There is no redo: popped actions are discarded.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use softbox_ipc::{GroundPos, RigId, RigSnapshot};
use tracing::debug;

/// A reversible rig operation, recorded after it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Add { snapshot: RigSnapshot },
    Remove { snapshot: RigSnapshot },
    Move { id: RigId, from: GroundPos, to: GroundPos },
}

impl Action {
    /// Id of the rig the action concerns
    pub fn rig_id(&self) -> &RigId {
        match self {
            Action::Add { snapshot } | Action::Remove { snapshot } => &snapshot.id,
            Action::Move { id, .. } => id,
        }
    }
}

/// FIFO-bounded stack of actions
#[derive(Debug, Clone)]
pub struct UndoLog {
    entries: VecDeque<Action>,
    capacity: usize,
}

impl UndoLog {
    /// A log keeping at most `capacity` actions (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an action, dropping the oldest entries past capacity
    pub fn push(&mut self, action: Action) {
        self.entries.push_back(action);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!("Undo log full, dropped oldest action for {}", evicted.rig_id());
            }
        }
    }

    /// Most recent action, if any
    pub fn pop(&mut self) -> Option<Action> {
        self.entries.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Actions from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.entries.iter()
    }
}
