//! Scene capture, restore and lighting presets.
//!
//! Restoring is all-or-nothing: the payload is validated and every geometry
//! is loaded before the current rigs are touched.

use std::collections::HashSet;

use softbox_ipc::{normalize_hex_color, RigSnapshot, SceneState};
use tracing::info;

use crate::assets::GeometryLoader;
use crate::error::{Result, StudioError};

use super::{LoadedRig, StudioState};

impl StudioState {
    /// Snapshot every rig plus the camera settings
    pub fn capture_state(&self) -> SceneState {
        SceneState {
            lights: self.rigs.iter().map(|r| r.snapshot()).collect(),
            camera_settings: Some(self.exposure.settings().into()),
        }
    }

    /// Replace the rigs (and camera settings, when present) with `state`.
    ///
    /// History is kept. On any error the studio is left as it was. A camera
    /// without a stored latch keeps the current one.
    pub async fn restore_state<L: GeometryLoader>(&mut self, loader: &L, state: &SceneState) -> Result<()> {
        self.replace_rigs(loader, &state.lights).await?;

        if let Some(camera) = state.camera_settings {
            self.update_camera(camera.apply_to(self.exposure.settings()));
        }
        info!("Restored scene with {} rigs", state.lights.len());
        Ok(())
    }

    /// Parse a JSON scene payload and restore it
    pub async fn restore_state_json<L: GeometryLoader>(&mut self, loader: &L, json: &str) -> Result<()> {
        let state = SceneState::from_json(json).map_err(|err| StudioError::MalformedScene(err.to_string()))?;
        self.restore_state(loader, &state).await
    }

    /// Replace the rigs with a preset's snapshots. History and camera are kept.
    pub async fn apply_preset<L: GeometryLoader>(&mut self, loader: &L, lights: &[RigSnapshot]) -> Result<()> {
        self.replace_rigs(loader, lights).await?;
        info!("Applied lighting preset with {} rigs", lights.len());
        Ok(())
    }

    async fn replace_rigs<L: GeometryLoader>(&mut self, loader: &L, lights: &[RigSnapshot]) -> Result<()> {
        validate_lights(lights)?;

        let mut loaded: Vec<LoadedRig> = Vec::with_capacity(lights.len());
        for snapshot in lights {
            loaded.push(Self::load_rig(loader, snapshot.kind).await?);
        }

        self.clear_rigs();
        for (rig, snapshot) in loaded.into_iter().zip(lights) {
            self.commit_snapshot(rig, snapshot)?;
        }

        let first = self.rigs.first().map(|r| r.id().clone());
        self.select_rig(first.as_ref());
        Ok(())
    }
}

fn validate_lights(lights: &[RigSnapshot]) -> Result<()> {
    let mut ids = HashSet::with_capacity(lights.len());
    for snapshot in lights {
        if !ids.insert(&snapshot.id) {
            return Err(StudioError::MalformedScene(format!("duplicate rig id {}", snapshot.id)));
        }
        normalize_hex_color(&snapshot.color)
            .map_err(|_| StudioError::MalformedScene(format!("rig {} has color {:?}", snapshot.id, snapshot.color)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use softbox_ipc::{CameraSettings, GroundPos, RigId, RigKind};

    use super::*;
    use crate::assets::MemoryLoader;
    use crate::state::test_support::FailingLoader;

    fn light(id: &str, kind: RigKind, x: f32, z: f32) -> RigSnapshot {
        RigSnapshot {
            id: RigId::new(id),
            kind,
            pos: GroundPos::new(x, z),
            power: 2400.0,
            size: 1.5,
            rotate_deg: 45.0,
            color: "#ffeedd".to_string(),
        }
    }

    #[tokio::test]
    async fn test_capture_restore_roundtrip() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let key = studio.create_rig(&loader, RigKind::L1).await.unwrap();
        studio.create_rig(&loader, RigKind::L5).await.unwrap();
        studio.set_rig_power(&key, 3200.0).unwrap();
        studio.update_camera(CameraSettings {
            iso: 800.0,
            f_number: 5.6,
            ..CameraSettings::default()
        });
        let saved = studio.capture_state();

        let mut other = StudioState::default();
        other.restore_state(&loader, &saved).await.unwrap();

        assert_eq!(other.capture_state(), saved);
        assert_eq!(other.selected(), Some(&key));
    }

    #[tokio::test]
    async fn test_restore_from_json() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let json = r##"{
            "lights": [
                { "id": "LAB12CD", "kind": "L2", "pos": { "x": -2, "z": 1 },
                  "power": 1000, "size": 2, "rotateDeg": 90, "color": "#ff0000" }
            ],
            "camera": { "iso": 400, "fstop": 8, "shutter": 0.004, "expComp": 0.5 }
        }"##;

        studio.restore_state_json(&loader, json).await.unwrap();

        assert_eq!(studio.rigs().len(), 1);
        assert_eq!(studio.rigs()[0].ground_pos(), GroundPos::new(-2.0, 1.0));
        assert_eq!(studio.exposure().settings().f_number, 8.0);
    }

    #[tokio::test]
    async fn test_restore_without_latch_keeps_frozen_exposure() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        studio.update_camera(CameraSettings {
            maintain_exposure: true,
            ..CameraSettings::default()
        });
        let frozen = studio.exposure().renderer_exposure();

        let json = r#"{ "lights": [], "camera": { "iso": 6400, "fstop": 1.4, "shutter": 0.5, "expComp": 3 } }"#;
        studio.restore_state_json(&loader, json).await.unwrap();

        let settings = studio.exposure().settings();
        assert_eq!(settings.iso, 6400.0);
        assert!(settings.maintain_exposure);
        assert_eq!(studio.exposure().locked_exposure(), Some(frozen));
        assert_eq!(studio.exposure().renderer_exposure().to_bits(), frozen.to_bits());
    }

    #[tokio::test]
    async fn test_malformed_payload_leaves_studio_untouched() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        studio.create_rig(&loader, RigKind::L3).await.unwrap();
        let before = studio.capture_state();

        let missing_field = r#"{ "lights": [ { "id": "L1", "kind": "L1" } ] }"#;
        assert!(matches!(
            studio.restore_state_json(&loader, missing_field).await,
            Err(StudioError::MalformedScene(_))
        ));

        let bad_color = SceneState {
            lights: vec![light("LA", RigKind::L1, 1.0, 1.0), RigSnapshot {
                color: "not-a-color".to_string(),
                ..light("LB", RigKind::L2, 2.0, 1.0)
            }],
            camera_settings: None,
        };
        assert!(studio.restore_state(&loader, &bad_color).await.is_err());

        let duplicate = SceneState {
            lights: vec![light("LA", RigKind::L1, 1.0, 1.0), light("LA", RigKind::L2, 2.0, 1.0)],
            camera_settings: None,
        };
        assert!(matches!(
            studio.restore_state(&loader, &duplicate).await,
            Err(StudioError::MalformedScene(_))
        ));

        let unloadable = SceneState {
            lights: vec![light("LA", RigKind::L1, 1.0, 1.0)],
            camera_settings: None,
        };
        assert!(studio.restore_state(&FailingLoader, &unloadable).await.is_err());

        assert_eq!(studio.capture_state(), before);
    }

    #[tokio::test]
    async fn test_apply_preset_keeps_history_and_camera() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        studio.create_rig(&loader, RigKind::L1).await.unwrap();
        let camera = studio.exposure().settings();

        let preset = [
            light("LKEY001", RigKind::L1, 1.5, 1.5),
            light("LFIL002", RigKind::L3, -1.5, 1.5),
            light("LRIM003", RigKind::L5, 0.0, -2.0),
        ];
        studio.apply_preset(&loader, &preset).await.unwrap();

        let ids: Vec<&str> = studio.rigs().iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["LKEY001", "LFIL002", "LRIM003"]);
        assert_eq!(studio.selected(), Some(&RigId::new("LKEY001")));
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.exposure().settings(), camera);
        for rig in studio.rigs() {
            assert!((rig.lowest_point_y() - 0.001).abs() < 1e-4);
        }
    }
}
