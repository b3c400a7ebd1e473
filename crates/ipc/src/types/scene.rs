//! Whole-scene persistence payload.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

use super::camera::SceneCamera;
use super::rig::RigSnapshot;

/// Everything the studio core captures for a saved scene.
///
/// Storage and transport (cloud save by name, files, ...) are up to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub lights: Vec<RigSnapshot>,
    /// Older payloads store these under `camera`
    #[serde(
        rename = "cameraSettings",
        alias = "camera",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub camera_settings: Option<SceneCamera>,
}

impl SceneState {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}
