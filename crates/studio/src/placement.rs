//! Emitter placement solver.
//!
//! Finds the point a fixture's light leaves from, and the direction it is
//! aimed, in the holder's local frame. Because the result is local, later
//! rotation edits re-aim the light without solving again.

use glam::{Mat4, Vec3};
use softbox_ipc::RigKind;

use crate::assets::RigGeometry;
use crate::geometry::world_bounds;

/// Bounds flatter than this are treated as this tall
pub const MIN_BOUNDS_HEIGHT: f32 = 0.001;

/// Where on its bounding box a fixture profile emits from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterProfile {
    /// Fraction of the box height, measured from the bottom
    pub height_fraction: f32,
    /// Offset along world +Z from the box center
    pub depth_offset: f32,
}

impl EmitterProfile {
    pub fn for_kind(kind: RigKind) -> Self {
        let (height_fraction, depth_offset) = match kind {
            RigKind::L1 => (0.96, 0.03),
            RigKind::L2 => (0.95, 0.025),
            RigKind::L3 => (0.95, 0.02),
            RigKind::L5 => (0.97, 0.04),
        };
        Self {
            height_fraction,
            depth_offset,
        }
    }
}

/// Shared "front" of every fixture model: local forward turned by -90°.
pub fn canonical_forward() -> Vec3 {
    let angle = (-90.0f32).to_radians();
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

/// Solved emitter frame of one rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterPlacement {
    pub anchor_local: Vec3,
    pub forward_local: Vec3,
}

/// Solve the emitter of `geometry`.
///
/// `holder_world` must be the holder's world matrix with zero rotation and
/// no floor offset; the model is a direct child of the holder.
pub fn solve_emitter(geometry: &RigGeometry, kind: RigKind, holder_world: &Mat4) -> EmitterPlacement {
    let profile = EmitterProfile::for_kind(kind);

    let anchor_local = match world_bounds(geometry.positions(), holder_world) {
        Some(bounds) => {
            let center = bounds.center();
            let height = bounds.height().max(MIN_BOUNDS_HEIGHT);
            let emitter_world = Vec3::new(
                center.x,
                bounds.min.y + height * profile.height_fraction,
                center.z + profile.depth_offset,
            );
            holder_world.inverse().transform_point3(emitter_world)
        }
        None => Vec3::ZERO,
    };

    EmitterPlacement {
        anchor_local,
        forward_local: canonical_forward(),
    }
}

/// Point the emitter is aimed at, in the same frame as `anchor`
pub fn aim_target(anchor: Vec3, forward: Vec3, distance: f32) -> Vec3 {
    anchor + forward * distance
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    #[test]
    fn test_canonical_forward_points_along_negative_x() {
        assert!(approx_eq_vec3(canonical_forward(), Vec3::NEG_X));
    }

    #[test]
    fn test_solve_in_holder_frame() {
        let geometry = RigGeometry::cuboid(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.6, 2.0, 0.4));
        let holder = Mat4::from_translation(Vec3::new(2.2, 0.0, 0.0));

        let placement = solve_emitter(&geometry, RigKind::L1, &holder);

        // min.y 0, height 2 -> 0.96 * 2
        assert!(approx_eq_vec3(placement.anchor_local, Vec3::new(0.0, 1.92, 0.03)));
        assert!(approx_eq_vec3(placement.forward_local, Vec3::NEG_X));
    }

    #[test]
    fn test_solve_with_scaled_holder() {
        let geometry = RigGeometry::cuboid(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.6, 2.0, 0.4));
        let holder = Mat4::from_scale(Vec3::splat(2.0));

        let placement = solve_emitter(&geometry, RigKind::L5, &holder);

        // World box is [0, 4] tall; the depth offset is taken in world units
        let expected = Vec3::new(0.0, 4.0 * 0.97, 0.04) / 2.0;
        assert!(approx_eq_vec3(placement.anchor_local, expected));
    }

    #[test]
    fn test_flat_geometry_uses_min_height() {
        let geometry = RigGeometry::cuboid(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.0, 1.0));
        let placement = solve_emitter(&geometry, RigKind::L3, &Mat4::IDENTITY);

        let expected_y = 0.5 + MIN_BOUNDS_HEIGHT * 0.95;
        assert!(placement.anchor_local.is_finite());
        assert!((placement.anchor_local.y - expected_y).abs() < EPSILON);
    }

    #[test]
    fn test_aim_target() {
        let target = aim_target(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_X, 2.0);
        assert!(approx_eq_vec3(target, Vec3::new(-2.0, 1.0, 0.0)));
    }
}
