//! Main IPC message enums for communication between the studio core and UI.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;
use crate::types::{AnchorAxis, CameraSettings, RigControls, RigId, RigKind};

/// Messages from the studio core to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StudioToUi {
    /// The rig list or the selection changed; rebuild the control modules
    ControlsChanged {
        rigs: Vec<RigControls>,
        selected: Option<RigId>,
    },

    /// Undo history changed (enables/disables the undo buttons)
    UndoAvailability { can_undo: bool, depth: usize },

    /// Exposure readout after a camera parameter edit
    ExposureChanged(ExposureInfo),

    /// Error notification
    Error { code: String, message: String },
}

impl StudioToUi {
    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Messages from the UI to the studio core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToStudio {
    /// Add a new fixture at the next default placement
    CreateRig { kind: RigKind },
    RemoveRig { id: RigId },
    /// Select a rig, or clear the selection with `None`
    SelectRig { id: Option<RigId> },
    SetPower { id: RigId, power: f32 },
    SetSize { id: RigId, size: f32 },
    SetRotation { id: RigId, degrees: f32 },
    SetColor { id: RigId, color: String },
    SetEmitterAnchor { id: RigId, axis: AnchorAxis, value: f32 },
    Undo,
    /// Clear rigs and history
    Reset,
    UpdateCamera(CameraSettings),
}

impl UiToStudio {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Display-ready exposure readout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureInfo {
    pub ev100: f32,
    /// Tone-mapping exposure actually applied to the renderer
    pub exposure: f32,
    pub locked: bool,
    pub iso_text: String,
    pub f_number_text: String,
    pub shutter_text: String,
    pub compensation_text: String,
    pub ev_text: String,
    pub exposure_text: String,
}
