//! Photographic camera parameters.

use serde::{Deserialize, Serialize};

/// Camera-like exposure inputs as edited by the user.
///
/// Inputs are taken as-is; only the derived renderer exposure is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub iso: f32,
    #[serde(rename = "fstop")]
    pub f_number: f32,
    /// Shutter time in seconds
    #[serde(rename = "shutter")]
    pub shutter_seconds: f32,
    #[serde(rename = "expComp")]
    pub exposure_compensation_stops: f32,
    /// Freeze rendered brightness while the other inputs change
    #[serde(rename = "maintainExposure", default)]
    pub maintain_exposure: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            iso: 200.0,
            f_number: 2.8,
            shutter_seconds: 0.008,
            exposure_compensation_stops: 0.0,
            maintain_exposure: false,
        }
    }
}

/// Camera settings as stored in a saved scene.
///
/// Scenes saved before the latch was persisted carry no `maintainExposure`.
/// Restoring one of those leaves the current latch as it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    pub iso: f32,
    #[serde(rename = "fstop")]
    pub f_number: f32,
    #[serde(rename = "shutter")]
    pub shutter_seconds: f32,
    #[serde(rename = "expComp")]
    pub exposure_compensation_stops: f32,
    #[serde(
        rename = "maintainExposure",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub maintain_exposure: Option<bool>,
}

impl SceneCamera {
    /// Settings after restoring this camera over `current`
    pub fn apply_to(&self, current: CameraSettings) -> CameraSettings {
        CameraSettings {
            iso: self.iso,
            f_number: self.f_number,
            shutter_seconds: self.shutter_seconds,
            exposure_compensation_stops: self.exposure_compensation_stops,
            maintain_exposure: self.maintain_exposure.unwrap_or(current.maintain_exposure),
        }
    }
}

impl From<CameraSettings> for SceneCamera {
    fn from(settings: CameraSettings) -> Self {
        Self {
            iso: settings.iso,
            f_number: settings.f_number,
            shutter_seconds: settings.shutter_seconds,
            exposure_compensation_stops: settings.exposure_compensation_stops,
            maintain_exposure: Some(settings.maintain_exposure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys() {
        let json = r#"{ "iso": 200, "fstop": 2.8, "shutter": 0.008, "expComp": -1 }"#;
        let settings: CameraSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.iso, 200.0);
        assert_eq!(settings.f_number, 2.8);
        assert_eq!(settings.shutter_seconds, 0.008);
        assert_eq!(settings.exposure_compensation_stops, -1.0);
        assert!(!settings.maintain_exposure);
    }

    #[test]
    fn test_scene_camera_without_latch_keeps_current() {
        let json = r#"{ "iso": 6400, "fstop": 1.4, "shutter": 0.5, "expComp": 3 }"#;
        let camera: SceneCamera = serde_json::from_str(json).unwrap();
        assert_eq!(camera.maintain_exposure, None);

        let latched = CameraSettings {
            maintain_exposure: true,
            ..CameraSettings::default()
        };
        let restored = camera.apply_to(latched);
        assert!(restored.maintain_exposure);
        assert_eq!(restored.iso, 6400.0);
        assert_eq!(restored.shutter_seconds, 0.5);
    }

    #[test]
    fn test_scene_camera_latch_overrides_current() {
        let camera = SceneCamera::from(CameraSettings::default());
        let latched = CameraSettings {
            maintain_exposure: true,
            ..CameraSettings::default()
        };
        assert_eq!(camera.apply_to(latched), CameraSettings::default());
    }
}
