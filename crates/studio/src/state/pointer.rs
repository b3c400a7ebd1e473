//! Pointer input of the overhead view: pick, drag, release.

use glam::Vec2;
use softbox_ipc::RigId;
use tracing::debug;

use crate::history::Action;
use crate::interaction::clamp_min_radius;
use crate::picking::{Layer, PickScene};

use super::StudioState;

impl StudioState {
    /// Pointer pressed at canvas pixel `(x, y)`.
    ///
    /// Returns the picked rig, which becomes selected and starts dragging.
    /// A miss changes nothing.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<RigId> {
        let ndc = self.viewport.ndc_from_pointer(x, y)?;
        self.pointer_down_ndc(ndc)
    }

    pub fn pointer_down_ndc(&mut self, ndc: Vec2) -> Option<RigId> {
        if self.interaction.is_dragging() {
            return None;
        }

        let ray = self.overhead_camera.ray_from_ndc(ndc);
        let picked = PickScene::from_rigs(&self.rigs).pick(&ray, Layer::Icons)?;
        let start = self.rig(&picked)?.ground_pos();

        self.select_rig(Some(&picked));
        self.interaction.begin(picked.clone(), start);
        debug!("Drag started on {} at ({:.3}, {:.3})", picked, start.x, start.z);
        Some(picked)
    }

    /// Pointer moved to canvas pixel `(x, y)`. Returns whether a rig moved.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        match self.viewport.ndc_from_pointer(x, y) {
            Some(ndc) => self.pointer_move_ndc(ndc),
            None => false,
        }
    }

    /// Drag the active rig to where the pointer ray meets the floor, kept
    /// outside the minimum radius. Skipped when the ray misses the floor.
    pub fn pointer_move_ndc(&mut self, ndc: Vec2) -> bool {
        let Some(target) = self.interaction.drag_target().cloned() else {
            return false;
        };

        let ray = self.overhead_camera.ray_from_ndc(ndc);
        let Some(hit) = ray.intersect_plane_y(self.config.placement.floor_y) else {
            return false;
        };
        let point = clamp_min_radius(Vec2::new(hit.x, hit.z), self.config.interaction.min_drag_radius);

        match self.rig_mut(&target) {
            Some(rig) => {
                rig.set_position(point.x, point.y);
                true
            }
            None => false,
        }
    }

    /// Pointer released. Records a `Move` unless the net drag was jitter.
    pub fn pointer_up(&mut self) -> Option<Action> {
        let (id, from) = self.interaction.finish()?;
        let to = self.rig(&id)?.ground_pos();

        if from.distance(&to) <= self.config.interaction.move_epsilon {
            return None;
        }

        let action = Action::Move { id, from, to };
        debug!("Drag committed: {:?}", action);
        self.history.push(action.clone());
        self.notify_history();
        Some(action)
    }

    /// Pointer capture lost; handled like a release
    pub fn pointer_cancel(&mut self) -> Option<Action> {
        self.pointer_up()
    }
}
