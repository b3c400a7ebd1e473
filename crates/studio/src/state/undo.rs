//! Undo and scene reset.

use softbox_ipc::StudioToUi;
use tracing::{debug, info, warn};

use crate::assets::GeometryLoader;
use crate::error::Result;
use crate::history::Action;

use super::StudioState;

impl StudioState {
    /// Revert the most recent action.
    ///
    /// Returns `Ok(false)` on an empty log. Reverting never records a new
    /// action. If recreating a removed rig fails, the action is put back so
    /// the undo can be retried.
    pub async fn undo<L: GeometryLoader>(&mut self, loader: &L) -> Result<bool> {
        let Some(action) = self.history.pop() else {
            debug!("Undo: no actions available");
            return Ok(false);
        };

        debug!("Undoing {:?}", action);

        match &action {
            Action::Add { snapshot } => {
                self.remove_rig_with(&snapshot.id, false);
            }
            Action::Remove { snapshot } => {
                if let Err(err) = self.recreate_from_snapshot(loader, snapshot).await {
                    self.history.push(action.clone());
                    return Err(err);
                }
            }
            Action::Move { id, from, .. } => {
                match self.rig_mut(id) {
                    Some(rig) => rig.set_position(from.x, from.z),
                    None => warn!("Skipping move undo, rig {} no longer exists", id),
                }
                self.notify_controls();
            }
        }

        self.notify_history();
        Ok(true)
    }

    /// Clear rigs, history and camera settings. Not undoable.
    pub fn reset(&mut self) {
        self.clear_rigs();
        self.history.clear();
        self.notify_history();
        let readout = self.exposure.reset();
        self.outbound
            .send(StudioToUi::ExposureChanged(readout.to_info()));
        info!("Studio reset");
    }
}
