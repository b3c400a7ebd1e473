//! Dispatch of UI commands.

use softbox_ipc::{StudioToUi, UiToStudio};
use tracing::warn;

use crate::assets::GeometryLoader;
use crate::error::{Result, StudioError};

use super::StudioState;

impl StudioState {
    /// Apply one command from the UI.
    ///
    /// Failures are returned and also queued as a `StudioToUi::Error`.
    pub async fn handle_command<L: GeometryLoader>(&mut self, loader: &L, command: UiToStudio) -> Result<()> {
        let result = self.dispatch(loader, command).await;
        if let Err(err) = &result {
            warn!("UI command failed: {}", err);
            self.outbound.send(StudioToUi::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            });
        }
        result
    }

    async fn dispatch<L: GeometryLoader>(&mut self, loader: &L, command: UiToStudio) -> Result<()> {
        match command {
            UiToStudio::CreateRig { kind } => {
                self.create_rig(loader, kind).await?;
            }
            UiToStudio::RemoveRig { id } => {
                self.remove_rig(&id).ok_or(StudioError::UnknownRig(id))?;
            }
            UiToStudio::SelectRig { id } => {
                if let Some(id) = &id {
                    if self.rig(id).is_none() {
                        return Err(StudioError::UnknownRig(id.clone()));
                    }
                }
                self.select_rig(id.as_ref());
            }
            UiToStudio::SetPower { id, power } => self.set_rig_power(&id, power)?,
            UiToStudio::SetSize { id, size } => self.set_rig_size(&id, size)?,
            UiToStudio::SetRotation { id, degrees } => self.set_rig_rotation(&id, degrees)?,
            UiToStudio::SetColor { id, color } => self.set_rig_color(&id, &color)?,
            UiToStudio::SetEmitterAnchor { id, axis, value } => {
                self.set_emitter_anchor(&id, axis, value)?
            }
            UiToStudio::Undo => {
                self.undo(loader).await?;
            }
            UiToStudio::Reset => self.reset(),
            UiToStudio::UpdateCamera(settings) => {
                self.update_camera(settings);
            }
        }
        Ok(())
    }
}
