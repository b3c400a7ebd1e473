//! Drag state machine of the overhead view.

use glam::Vec2;
use softbox_ipc::{GroundPos, RigId};

/// `Idle -> Dragging -> Idle`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        rig: RigId,
        /// Position before the drag started
        start: GroundPos,
    },
}

/// Pointer interaction state of the overhead view
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub state: DragState,
    /// Camera orbit control; off while a rig is dragged
    pub orbit_enabled: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            orbit_enabled: true,
        }
    }
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Rig currently being dragged
    pub fn drag_target(&self) -> Option<&RigId> {
        match &self.state {
            DragState::Dragging { rig, .. } => Some(rig),
            DragState::Idle => None,
        }
    }

    pub(crate) fn begin(&mut self, rig: RigId, start: GroundPos) {
        self.state = DragState::Dragging { rig, start };
        self.orbit_enabled = false;
    }

    /// Leave the drag, returning what was being dragged
    pub(crate) fn finish(&mut self) -> Option<(RigId, GroundPos)> {
        self.orbit_enabled = true;
        match std::mem::take(&mut self.state) {
            DragState::Dragging { rig, start } => Some((rig, start)),
            DragState::Idle => None,
        }
    }
}

/// Push `point` out to at least `min_radius` from the origin, keeping its
/// direction. A point exactly at the origin is pushed along +X.
pub fn clamp_min_radius(point: Vec2, min_radius: f32) -> Vec2 {
    let length = point.length();
    if length >= min_radius {
        return point;
    }
    let direction = if length > f32::EPSILON {
        point / length
    } else {
        Vec2::X
    };
    direction * min_radius
}
