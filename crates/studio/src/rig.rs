//! Light rig model.
//!
//! A rig is a two-link transform chain:
//!
//! ```text
//! assembly  T(x, 0, z)                         user drags this
//!   holder  T(0, floor_offset, 0) · Ry(rot) · S(base_scale · size)
//!     model     loaded fixture geometry
//!     emitter   anchor_local
//!     target    anchor_local + forward_local · aim_distance
//! ```
//!
//! Only the numbers above are stored. World-space values are composed on
//! demand, so there is nothing to keep in sync besides the floor offset.

use glam::{Quat, Vec2, Vec3};
use softbox_config::{PlacementConfig, StudioConfig};
use softbox_ipc::{
    normalize_hex_color, parse_hex_color, AnchorAxis, GroundPos, IpcError, RigControls, RigId,
    RigKind, RigSnapshot,
};

use crate::assets::RigGeometry;
use crate::geometry::{compose, floor_snap_offset, world_bounds, Aabb, LocalTransform};
use crate::placement::{aim_target, solve_emitter};

pub const ROTATION_RANGE_DEG: (f32, f32) = (-180.0, 180.0);
pub const SIZE_RANGE: (f32, f32) = (0.25, 6.0);
pub const POWER_RANGE: (f32, f32) = (0.0, 6000.0);

/// Cone half-angle of a size 1 rig, in degrees
pub const BASE_SPOT_ANGLE_DEG: f32 = 42.0;
pub const SPOT_ANGLE_RANGE_DEG: (f32, f32) = (18.0, 80.0);
pub const SPOT_PENUMBRA_RANGE: (f32, f32) = (0.05, 0.9);
pub const SPOT_RANGE: f32 = 35.0;
pub const SPOT_DECAY: f32 = 2.0;

/// Spotlight parameters derived from a rig
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotParams {
    pub position: Vec3,
    pub target: Vec3,
    /// Cone half-angle in radians
    pub angle: f32,
    pub penumbra: f32,
    pub range: f32,
    pub decay: f32,
    pub intensity: f32,
    /// sRGB components
    pub color: [f32; 3],
}

/// Placement constants a rig needs after creation
#[derive(Debug, Clone, Copy, PartialEq)]
struct RigTuning {
    icon_base_scale: f32,
    aim_distance: f32,
    floor_y: f32,
    floor_epsilon: f32,
}

impl From<&PlacementConfig> for RigTuning {
    fn from(config: &PlacementConfig) -> Self {
        Self {
            icon_base_scale: config.icon_base_scale,
            aim_distance: config.aim_distance,
            floor_y: config.floor_y,
            floor_epsilon: config.floor_epsilon,
        }
    }
}

/// One placed light fixture
#[derive(Debug, Clone)]
pub struct LightRig {
    id: RigId,
    kind: RigKind,
    geometry: RigGeometry,
    tuning: RigTuning,

    position: Vec2,
    rotation_deg: f32,
    size: f32,
    power: f32,
    color: String,
    color_rgb: [f32; 3],

    emitter_anchor: Vec3,
    forward: Vec3,
    floor_offset: f32,
    indicator_opacity: f32,
}

/// Yaw (degrees) that turns a holder at `position` toward the world origin
pub fn facing_origin_deg(position: Vec2) -> f32 {
    (-position.x).atan2(-position.y).to_degrees()
}

impl LightRig {
    /// Build a rig around freshly loaded geometry at `position` (x, z).
    ///
    /// The emitter is solved at zero rotation and unit scale, then the
    /// configured defaults (default yaw included) are applied through the
    /// regular setters.
    pub fn new(
        id: RigId,
        kind: RigKind,
        geometry: RigGeometry,
        position: Vec2,
        config: &StudioConfig,
    ) -> Result<Self, IpcError> {
        let defaults = &config.rig_defaults;
        let color = normalize_hex_color(&defaults.color)?;
        let color_rgb = parse_hex_color(&color)?;

        let mut rig = Self {
            id,
            kind,
            geometry,
            tuning: RigTuning::from(&config.placement),
            position,
            rotation_deg: facing_origin_deg(position),
            size: 1.0,
            power: defaults.power,
            color,
            color_rgb,
            emitter_anchor: Vec3::ZERO,
            forward: Vec3::ZERO,
            floor_offset: 0.0,
            indicator_opacity: config.interaction.unselected_opacity,
        };

        // Zero rotation, unit scale, no floor offset
        let solve_frame = compose(&[rig.assembly_transform(), LocalTransform::default()]);
        let placement = solve_emitter(&rig.geometry, kind, &solve_frame);
        rig.emitter_anchor = placement.anchor_local;
        rig.forward = placement.forward_local;

        rig.set_power(defaults.power);
        rig.set_size(defaults.size);
        // The configured default yaw replaces the facing-origin yaw
        rig.set_rotation(defaults.rotation_deg);
        rig.refresh_placement();
        Ok(rig)
    }

    pub fn id(&self) -> &RigId {
        &self.id
    }

    pub fn kind(&self) -> RigKind {
        self.kind
    }

    pub fn geometry(&self) -> &RigGeometry {
        &self.geometry
    }

    /// Horizontal position (x, z)
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn ground_pos(&self) -> GroundPos {
        GroundPos::new(self.position.x, self.position.y)
    }

    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    /// Normalized `#rrggbb` color
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn color_rgb(&self) -> [f32; 3] {
        self.color_rgb
    }

    pub fn emitter_anchor(&self) -> Vec3 {
        self.emitter_anchor
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Vertical offset of the holder that keeps the model on the floor
    pub fn floor_offset(&self) -> f32 {
        self.floor_offset
    }

    pub fn indicator_opacity(&self) -> f32 {
        self.indicator_opacity
    }

    pub(crate) fn set_indicator_opacity(&mut self, opacity: f32) {
        self.indicator_opacity = opacity;
    }

    pub fn set_position(&mut self, x: f32, z: f32) {
        if x.is_finite() && z.is_finite() {
            self.position = Vec2::new(x, z);
        }
    }

    pub fn set_power(&mut self, power: f32) {
        if power.is_finite() {
            self.power = power.clamp(POWER_RANGE.0, POWER_RANGE.1);
        }
    }

    /// Rescale the fixture and snap it back onto the floor
    pub fn set_size(&mut self, size: f32) {
        if size.is_finite() {
            self.size = size.clamp(SIZE_RANGE.0, SIZE_RANGE.1);
            self.refresh_placement();
        }
    }

    /// Yaw of the holder. The emitter and target follow, their local
    /// values are untouched.
    pub fn set_rotation(&mut self, degrees: f32) {
        if degrees.is_finite() {
            self.rotation_deg = degrees.clamp(ROTATION_RANGE_DEG.0, ROTATION_RANGE_DEG.1);
            self.refresh_placement();
        }
    }

    /// Set the light color from a hex string. Invalid input leaves the
    /// current color in place.
    pub fn set_color(&mut self, color: &str) -> Result<(), IpcError> {
        let normalized = normalize_hex_color(color)?;
        self.color_rgb = parse_hex_color(&normalized)?;
        self.color = normalized;
        Ok(())
    }

    pub fn set_emitter_anchor(&mut self, axis: AnchorAxis, value: f32) {
        if !value.is_finite() {
            return;
        }
        let value = axis.clamp(value);
        match axis {
            AnchorAxis::X => self.emitter_anchor.x = value,
            AnchorAxis::Y => self.emitter_anchor.y = value,
            AnchorAxis::Z => self.emitter_anchor.z = value,
        }
        self.refresh_placement();
    }

    /// Recompute the floor snap for the current scale and rotation
    fn refresh_placement(&mut self) {
        let unsnapped = compose(&[self.assembly_transform(), self.holder_transform_at(0.0)]);
        if let Some(bounds) = world_bounds(self.geometry.positions(), &unsnapped) {
            self.floor_offset =
                floor_snap_offset(&bounds, self.tuning.floor_y, self.tuning.floor_epsilon);
        }
    }

    pub fn assembly_transform(&self) -> LocalTransform {
        LocalTransform::from_translation(Vec3::new(self.position.x, 0.0, self.position.y))
    }

    pub fn holder_transform(&self) -> LocalTransform {
        self.holder_transform_at(self.floor_offset)
    }

    fn holder_transform_at(&self, floor_offset: f32) -> LocalTransform {
        LocalTransform::from_translation(Vec3::new(0.0, floor_offset, 0.0))
            .with_rotation(Quat::from_rotation_y(self.rotation_deg.to_radians()))
            .with_uniform_scale(self.tuning.icon_base_scale * self.size)
    }

    /// World matrix of the holder (and of the model inside it)
    pub fn holder_world(&self) -> glam::Mat4 {
        compose(&[self.assembly_transform(), self.holder_transform()])
    }

    /// World-space bounds of the fixture model
    pub fn world_bounds(&self) -> Aabb {
        self.geometry.local_bounds().transformed(&self.holder_world())
    }

    /// Lowest world-space point of the fixture model
    pub fn lowest_point_y(&self) -> f32 {
        world_bounds(self.geometry.positions(), &self.holder_world())
            .map(|b| b.min.y)
            .unwrap_or(self.tuning.floor_y)
    }

    pub fn aim_target_local(&self) -> Vec3 {
        aim_target(self.emitter_anchor, self.forward, self.tuning.aim_distance)
    }

    pub fn emitter_world(&self) -> Vec3 {
        self.holder_world().transform_point3(self.emitter_anchor)
    }

    pub fn target_world(&self) -> Vec3 {
        self.holder_world().transform_point3(self.aim_target_local())
    }

    /// Cone half-angle in radians
    pub fn spot_angle(&self) -> f32 {
        let (min, max) = SPOT_ANGLE_RANGE_DEG;
        (BASE_SPOT_ANGLE_DEG * self.size.sqrt())
            .clamp(min, max)
            .to_radians()
    }

    pub fn spot_penumbra(&self) -> f32 {
        let (min, max) = SPOT_PENUMBRA_RANGE;
        (0.10 + 0.35 * (self.size + 1.0).ln()).clamp(min, max)
    }

    pub fn spot(&self) -> SpotParams {
        let world = self.holder_world();
        SpotParams {
            position: world.transform_point3(self.emitter_anchor),
            target: world.transform_point3(self.aim_target_local()),
            angle: self.spot_angle(),
            penumbra: self.spot_penumbra(),
            range: SPOT_RANGE,
            decay: SPOT_DECAY,
            intensity: self.power,
            color: self.color_rgb,
        }
    }

    pub fn snapshot(&self) -> RigSnapshot {
        RigSnapshot {
            id: self.id.clone(),
            kind: self.kind,
            pos: self.ground_pos(),
            power: self.power,
            size: self.size,
            rotate_deg: self.rotation_deg,
            color: self.color.clone(),
        }
    }

    pub fn controls(&self, selected: bool) -> RigControls {
        RigControls {
            snapshot: self.snapshot(),
            display_name: self.kind.display_name().to_string(),
            selected,
            indicator_opacity: self.indicator_opacity,
            emitter_anchor: self.emitter_anchor.to_array(),
        }
    }
}
