//! Rig creation, removal and parameter edits.

use glam::Vec2;
use softbox_ipc::{normalize_hex_color, AnchorAxis, RigId, RigKind, RigSnapshot};
use tracing::{debug, info};

use crate::assets::{asset_path, GeometryLoader, RigGeometry};
use crate::error::{Result, StudioError};
use crate::history::Action;
use crate::rig::LightRig;

use super::StudioState;

/// Geometry loaded for a rig that has not joined the studio yet.
///
/// Nothing about a loaded rig is visible to picking, dragging or snapshots
/// until it is committed.
#[derive(Debug, Clone)]
pub struct LoadedRig {
    kind: RigKind,
    geometry: RigGeometry,
}

impl LoadedRig {
    pub fn kind(&self) -> RigKind {
        self.kind
    }
}

impl StudioState {
    /// Load the geometry of a new rig.
    ///
    /// This does not touch the studio, so several loads may run at once; each
    /// result is committed with [`StudioState::commit_rig`] when it arrives.
    pub async fn load_rig<L: GeometryLoader>(loader: &L, kind: RigKind) -> Result<LoadedRig> {
        let path = asset_path(kind);
        let geometry = loader
            .load(path)
            .await
            .map_err(|source| StudioError::GeometryLoad { kind, source })?;
        debug!("Loaded {} geometry from {}", kind, path);
        Ok(LoadedRig { kind, geometry })
    }

    /// Add a loaded rig to the studio.
    ///
    /// The rig goes on the default ring at the slot for the current rig
    /// count, so placement and the `Add` entry follow completion order.
    /// `id` is generated when `None`.
    pub fn commit_rig(&mut self, loaded: LoadedRig, id: Option<RigId>, record: bool) -> Result<RigId> {
        let id = match id {
            Some(id) if self.rig(&id).is_some() => return Err(StudioError::DuplicateRig(id)),
            Some(id) => id,
            None => {
                let rigs = &self.rigs;
                self.ids.next(|candidate| rigs.iter().any(|r| r.id() == candidate))
            }
        };

        let [x, z] = self.config.placement.ring_position(self.rigs.len());
        let rig = LightRig::new(
            id.clone(),
            loaded.kind,
            loaded.geometry,
            Vec2::new(x, z),
            &self.config,
        )?;
        let snapshot = rig.snapshot();
        self.rigs.push(rig);

        info!("Created {} rig {} at ({:.2}, {:.2})", loaded.kind, id, x, z);

        if record {
            self.history.push(Action::Add { snapshot });
            self.notify_history();
        }
        Ok(id)
    }

    /// Create a rig of `kind` and select it.
    ///
    /// On a load failure nothing changes: no rig, no history entry, same
    /// selection.
    pub async fn create_rig<L: GeometryLoader>(&mut self, loader: &L, kind: RigKind) -> Result<RigId> {
        let loaded = Self::load_rig(loader, kind).await?;
        let id = self.commit_rig(loaded, None, true)?;
        self.select_rig(Some(&id));
        Ok(id)
    }

    /// Recreate a rig from its snapshot without recording history.
    pub async fn recreate_from_snapshot<L: GeometryLoader>(
        &mut self,
        loader: &L,
        snapshot: &RigSnapshot,
    ) -> Result<RigId> {
        normalize_hex_color(&snapshot.color)?;
        let loaded = Self::load_rig(loader, snapshot.kind).await?;
        let id = self.commit_snapshot(loaded, snapshot)?;
        self.notify_controls();
        Ok(id)
    }

    /// Commit `loaded` under the snapshot's id and replay its fields.
    ///
    /// Order matters: size re-snaps the fixture to the floor, which needs the
    /// geometry in place.
    pub(crate) fn commit_snapshot(&mut self, loaded: LoadedRig, snapshot: &RigSnapshot) -> Result<RigId> {
        let color = normalize_hex_color(&snapshot.color)?;
        if loaded.kind != snapshot.kind {
            return Err(StudioError::MalformedScene(format!(
                "rig {} is {} but {} geometry was loaded",
                snapshot.id, snapshot.kind, loaded.kind
            )));
        }

        let id = self.commit_rig(loaded, Some(snapshot.id.clone()), false)?;
        let rig = self
            .rig_mut(&id)
            .ok_or_else(|| StudioError::UnknownRig(id.clone()))?;
        rig.set_position(snapshot.pos.x, snapshot.pos.z);
        rig.set_power(snapshot.power);
        rig.set_size(snapshot.size);
        rig.set_rotation(snapshot.rotate_deg);
        rig.set_color(&color)?;
        Ok(id)
    }

    /// Remove a rig, recording a `Remove` action.
    ///
    /// Returns the removed rig's snapshot, or `None` for an unknown id.
    pub fn remove_rig(&mut self, id: &RigId) -> Option<RigSnapshot> {
        self.remove_rig_with(id, true)
    }

    pub(crate) fn remove_rig_with(&mut self, id: &RigId, record: bool) -> Option<RigSnapshot> {
        let index = self.rigs.iter().position(|r| r.id() == id)?;
        let rig = self.rigs.remove(index);
        let snapshot = rig.snapshot();

        if self.interaction.drag_target() == Some(id) {
            self.interaction.finish();
        }

        info!("Removed rig {}", id);

        if record {
            self.history.push(Action::Remove {
                snapshot: snapshot.clone(),
            });
            self.notify_history();
        }

        if self.selected.as_ref() == Some(id) {
            let first = self.rigs.first().map(|r| r.id().clone());
            self.select_rig(first.as_ref());
        } else {
            self.notify_controls();
        }
        Some(snapshot)
    }

    /// Remove every rig and clear the selection. History is kept.
    pub fn clear_rigs(&mut self) {
        self.rigs.clear();
        self.selected = None;
        self.interaction.finish();
        self.notify_controls();
    }

    pub fn snapshot(&self, id: &RigId) -> Result<RigSnapshot> {
        self.rig(id)
            .map(LightRig::snapshot)
            .ok_or_else(|| StudioError::UnknownRig(id.clone()))
    }

    fn edit_rig(&mut self, id: &RigId, edit: impl FnOnce(&mut LightRig)) -> Result<()> {
        let rig = self
            .rig_mut(id)
            .ok_or_else(|| StudioError::UnknownRig(id.clone()))?;
        edit(rig);
        Ok(())
    }

    pub fn set_rig_position(&mut self, id: &RigId, x: f32, z: f32) -> Result<()> {
        self.edit_rig(id, |rig| rig.set_position(x, z))
    }

    pub fn set_rig_power(&mut self, id: &RigId, power: f32) -> Result<()> {
        self.edit_rig(id, |rig| rig.set_power(power))
    }

    pub fn set_rig_size(&mut self, id: &RigId, size: f32) -> Result<()> {
        self.edit_rig(id, |rig| rig.set_size(size))
    }

    pub fn set_rig_rotation(&mut self, id: &RigId, degrees: f32) -> Result<()> {
        self.edit_rig(id, |rig| rig.set_rotation(degrees))
    }

    pub fn set_rig_color(&mut self, id: &RigId, color: &str) -> Result<()> {
        let rig = self
            .rig_mut(id)
            .ok_or_else(|| StudioError::UnknownRig(id.clone()))?;
        rig.set_color(color)?;
        Ok(())
    }

    pub fn set_emitter_anchor(&mut self, id: &RigId, axis: AnchorAxis, value: f32) -> Result<()> {
        self.edit_rig(id, |rig| rig.set_emitter_anchor(axis, value))
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream::{FuturesUnordered, StreamExt};
    use softbox_ipc::{GroundPos, StudioToUi};

    use super::*;
    use crate::assets::MemoryLoader;
    use crate::state::test_support::{FailingLoader, GatedLoader};

    const EPSILON: f32 = 1e-4;

    #[tokio::test]
    async fn test_first_rig_on_ring() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();

        let id = studio.create_rig(&loader, RigKind::L1).await.unwrap();
        let snapshot = studio.snapshot(&id).unwrap();

        assert!((snapshot.pos.x - 2.2).abs() < EPSILON);
        assert!(snapshot.pos.z.abs() < EPSILON);
        assert_eq!(snapshot.power, 1800.0);
        assert_eq!(snapshot.size, 1.0);
        assert_eq!(snapshot.rotate_deg, -100.0);
        assert_eq!(studio.selected(), Some(&id));
        assert_eq!(studio.history().len(), 1);
    }

    #[tokio::test]
    async fn test_successive_rigs_follow_ring() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();

        for kind in RigKind::ALL {
            studio.create_rig(&loader, kind).await.unwrap();
        }

        for (index, rig) in studio.rigs().iter().enumerate() {
            let angle = index as f32 * 0.9;
            let expected = Vec2::new(angle.cos(), angle.sin()) * 2.2;
            assert!((rig.position() - expected).length() < EPSILON);
        }
        // Last created rig is selected
        assert_eq!(studio.selected(), Some(studio.rigs()[3].id()));
    }

    #[tokio::test]
    async fn test_failed_load_changes_nothing() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let first = studio.create_rig(&loader, RigKind::L2).await.unwrap();
        studio.drain_outbound();

        let result = studio.create_rig(&FailingLoader, RigKind::L3).await;

        assert!(matches!(
            result,
            Err(StudioError::GeometryLoad {
                kind: RigKind::L3,
                ..
            })
        ));
        assert_eq!(studio.rigs().len(), 1);
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.selected(), Some(&first));
        assert!(studio.drain_outbound().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creation_follows_completion_order() {
        let loader = GatedLoader::new();
        let open_l1 = loader.gate(RigKind::L1);
        let open_l5 = loader.gate(RigKind::L5);
        let mut studio = StudioState::default();

        let mut pending = FuturesUnordered::new();
        pending.push(StudioState::load_rig(&loader, RigKind::L1));
        pending.push(StudioState::load_rig(&loader, RigKind::L5));

        // L5 was requested second but finishes first
        open_l5.send(()).unwrap();
        let loaded = pending.next().await.unwrap().unwrap();
        assert_eq!(loaded.kind(), RigKind::L5);
        let l5 = studio.commit_rig(loaded, None, true).unwrap();

        open_l1.send(()).unwrap();
        let loaded = pending.next().await.unwrap().unwrap();
        let l1 = studio.commit_rig(loaded, None, true).unwrap();

        assert_eq!(studio.rig(&l5).unwrap().ground_pos(), GroundPos::new(2.2, 0.0));
        let order: Vec<&RigId> = studio.history().iter().map(|a| a.rig_id()).collect();
        assert_eq!(order, vec![&l5, &l1]);
        assert_eq!(studio.rigs()[0].kind(), RigKind::L5);
    }

    #[tokio::test]
    async fn test_remove_selected_falls_back_to_first() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let a = studio.create_rig(&loader, RigKind::L1).await.unwrap();
        let b = studio.create_rig(&loader, RigKind::L2).await.unwrap();
        let c = studio.create_rig(&loader, RigKind::L3).await.unwrap();
        assert_eq!(studio.selected(), Some(&c));

        let removed = studio.remove_rig(&c).unwrap();
        assert_eq!(removed.id, c);
        assert_eq!(studio.selected(), Some(&a));
        assert_eq!(studio.rig(&a).unwrap().indicator_opacity(), 1.0);
        assert_eq!(studio.rig(&b).unwrap().indicator_opacity(), 0.35);
        assert!(matches!(studio.history().iter().last(), Some(Action::Remove { .. })));

        assert!(studio.remove_rig(&c).is_none());
    }

    #[tokio::test]
    async fn test_remove_unselected_keeps_selection() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let a = studio.create_rig(&loader, RigKind::L1).await.unwrap();
        let b = studio.create_rig(&loader, RigKind::L5).await.unwrap();
        studio.drain_outbound();

        studio.remove_rig(&a);

        assert_eq!(studio.selected(), Some(&b));
        let messages = studio.drain_outbound();
        assert!(messages
            .iter()
            .any(|m| matches!(m, StudioToUi::ControlsChanged { rigs, .. } if rigs.len() == 1)));
    }

    #[tokio::test]
    async fn test_recreate_from_snapshot_replays_fields() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let snapshot = RigSnapshot {
            id: RigId::new("L0BEEF0"),
            kind: RigKind::L3,
            pos: GroundPos::new(-1.0, 3.0),
            power: 900.0,
            size: 2.5,
            rotate_deg: 30.0,
            color: "#FFAA00".to_string(),
        };

        let id = studio.recreate_from_snapshot(&loader, &snapshot).await.unwrap();

        assert_eq!(id, snapshot.id);
        let rig = studio.rig(&id).unwrap();
        assert_eq!(rig.snapshot(), RigSnapshot {
            color: "#ffaa00".to_string(),
            ..snapshot.clone()
        });
        assert!((rig.lowest_point_y() - 0.001).abs() < EPSILON);
        assert!(studio.history().is_empty());

        // Same id again is refused
        let again = studio.recreate_from_snapshot(&loader, &snapshot).await;
        assert!(matches!(again, Err(StudioError::DuplicateRig(_))));
    }

    #[tokio::test]
    async fn test_generated_ids_skip_restored_ones() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let snapshot = RigSnapshot {
            id: RigId::new("L000001"),
            kind: RigKind::L1,
            pos: GroundPos::new(2.0, 0.0),
            power: 100.0,
            size: 1.0,
            rotate_deg: 0.0,
            color: "#ffffff".to_string(),
        };
        studio.recreate_from_snapshot(&loader, &snapshot).await.unwrap();

        let id = studio.create_rig(&loader, RigKind::L2).await.unwrap();
        assert_eq!(id, RigId::new("L000002"));
    }

    #[tokio::test]
    async fn test_setters_on_unknown_rig() {
        let mut studio = StudioState::default();
        let ghost = RigId::new("LFFFFFF");
        assert!(matches!(
            studio.set_rig_power(&ghost, 10.0),
            Err(StudioError::UnknownRig(_))
        ));
        assert!(matches!(
            studio.set_rig_color(&ghost, "#fff"),
            Err(StudioError::UnknownRig(_))
        ));
    }

    #[tokio::test]
    async fn test_setters_clamp_through_state() {
        let loader = MemoryLoader::with_default_fixtures();
        let mut studio = StudioState::default();
        let id = studio.create_rig(&loader, RigKind::L1).await.unwrap();

        studio.set_rig_power(&id, 7000.0).unwrap();
        studio.set_rig_size(&id, 0.1).unwrap();
        studio.set_rig_rotation(&id, -720.0).unwrap();
        studio.set_emitter_anchor(&id, AnchorAxis::Z, 2.0).unwrap();
        assert!(matches!(
            studio.set_rig_color(&id, "#12345g"),
            Err(StudioError::InvalidColor(_))
        ));

        let rig = studio.rig(&id).unwrap();
        assert_eq!(rig.power(), 6000.0);
        assert_eq!(rig.size(), 0.25);
        assert_eq!(rig.rotation_deg(), -180.0);
        assert_eq!(rig.emitter_anchor().z, 0.5);
        assert_eq!(rig.color(), "#ffffff");
    }
}
