//! Shared configuration for Softbox
//!
//! This crate is the single source of truth for the numeric tunables the
//! studio core relies on: where new rigs are placed, how far a fixture may be
//! dragged toward the subject, how deep the undo history is, the default rig
//! parameters and the exposure constants.
//!
//! Every struct deserializes with `#[serde(default)]`, so a host file only
//! needs to name the values it wants to change. A handful of values can also
//! be overridden through `SOFTBOX_*` environment variables.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Radius of the ring new rigs are placed on
pub const DEFAULT_RING_RADIUS: f32 = 2.2;

/// Angle (radians) between successive default placements on the ring
pub const DEFAULT_RING_ANGLE_STEP: f32 = 0.9;

/// Distance from the emitter anchor to the aim target, in holder units
pub const DEFAULT_AIM_DISTANCE: f32 = 2.0;

/// Height of the studio floor
pub const DEFAULT_FLOOR_Y: f32 = 0.0;

/// Gap kept between a fixture's lowest point and the floor
pub const DEFAULT_FLOOR_EPSILON: f32 = 0.001;

/// Scale applied to fixture geometry before the user size multiplier
pub const DEFAULT_ICON_BASE_SCALE: f32 = 0.35;

/// Closest a fixture may be dragged to the world origin
pub const DEFAULT_MIN_DRAG_RADIUS: f32 = 0.6;

/// Drags shorter than this are treated as jitter and not recorded
pub const DEFAULT_MOVE_EPSILON: f32 = 0.0001;

/// Maximum number of undoable actions kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Base multiplier of the EV-to-exposure curve
pub const DEFAULT_BASE_EXPOSURE: f32 = 0.85;

/// Renderer tone-mapping exposure before the first recompute
pub const DEFAULT_INITIAL_EXPOSURE: f32 = 1.05;

/// Where new rigs are placed and how their emitters are aimed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub ring_radius: f32,
    pub ring_angle_step: f32,
    pub aim_distance: f32,
    pub floor_y: f32,
    pub floor_epsilon: f32,
    pub icon_base_scale: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            ring_radius: DEFAULT_RING_RADIUS,
            ring_angle_step: DEFAULT_RING_ANGLE_STEP,
            aim_distance: DEFAULT_AIM_DISTANCE,
            floor_y: DEFAULT_FLOOR_Y,
            floor_epsilon: DEFAULT_FLOOR_EPSILON,
            icon_base_scale: DEFAULT_ICON_BASE_SCALE,
        }
    }
}

impl PlacementConfig {
    /// Horizontal (x, z) position of the `index`-th default placement
    pub fn ring_position(&self, index: usize) -> [f32; 2] {
        let angle = index as f32 * self.ring_angle_step;
        [angle.cos() * self.ring_radius, angle.sin() * self.ring_radius]
    }
}

/// Pointer interaction tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub min_drag_radius: f32,
    pub move_epsilon: f32,
    /// Selection ring opacity of the selected rig
    pub selected_opacity: f32,
    /// Selection ring opacity of every other rig
    pub unselected_opacity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_drag_radius: DEFAULT_MIN_DRAG_RADIUS,
            move_epsilon: DEFAULT_MOVE_EPSILON,
            selected_opacity: 1.0,
            unselected_opacity: 0.35,
        }
    }
}

/// Parameters a freshly created rig starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigDefaults {
    pub power: f32,
    pub size: f32,
    pub rotation_deg: f32,
    /// Hex color string (`#rrggbb`)
    pub color: String,
}

impl Default for RigDefaults {
    fn default() -> Self {
        Self {
            power: 1800.0,
            size: 1.0,
            rotation_deg: -100.0,
            color: "#ffffff".to_string(),
        }
    }
}

/// Constants of the EV-to-exposure curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    pub base_exposure: f32,
    /// EV100 at which the curve yields `base_exposure`
    pub reference_ev: f32,
    pub min_exposure: f32,
    pub max_exposure: f32,
    pub initial_exposure: f32,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            base_exposure: DEFAULT_BASE_EXPOSURE,
            reference_ev: 10.0,
            min_exposure: 0.02,
            max_exposure: 4.0,
            initial_exposure: DEFAULT_INITIAL_EXPOSURE,
        }
    }
}

/// Perspective camera of the overhead (top-down) view used for picking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverheadCameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OverheadCameraConfig {
    fn default() -> Self {
        Self {
            // Nudged off the vertical axis so the look-at basis stays defined
            position: [0.0, 8.0, 0.001],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 55.0,
            near: 0.1,
            far: 200.0,
        }
    }
}

/// Top-level studio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct StudioConfig {
    pub placement: PlacementConfig,
    pub interaction: InteractionConfig,
    pub history_capacity: usize,
    pub rig_defaults: RigDefaults,
    pub exposure: ExposureConfig,
    pub overhead_camera: OverheadCameraConfig,
}

/// Errors raised while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl StudioConfig {
    /// Parse a JSON config, filling in defaults for anything not named.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with `SOFTBOX_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides read through `lookup`.
    ///
    /// Values that fail to parse or fall outside their domain are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = parse_usize(&lookup, "SOFTBOX_HISTORY_CAPACITY") {
            if value > 0 {
                config.history_capacity = value;
            }
        }
        if let Some(value) = parse_f32(&lookup, "SOFTBOX_MIN_DRAG_RADIUS") {
            if value.is_finite() && value >= 0.0 {
                config.interaction.min_drag_radius = value;
            }
        }
        if let Some(value) = parse_f32(&lookup, "SOFTBOX_AIM_DISTANCE") {
            if value.is_finite() && value > 0.0 {
                config.placement.aim_distance = value;
            }
        }
        if let Some(value) = parse_f32(&lookup, "SOFTBOX_FLOOR_EPSILON") {
            if value.is_finite() && value >= 0.0 {
                config.placement.floor_epsilon = value;
            }
        }
        if let Some(value) = parse_f32(&lookup, "SOFTBOX_BASE_EXPOSURE") {
            if value.is_finite() && value > 0.0 {
                config.exposure.base_exposure = value;
            }
        }

        debug!(?config, "Resolved studio config");
        config
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "history_capacity",
                reason: "must keep at least one entry".to_string(),
            });
        }
        if !(self.placement.icon_base_scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "placement.icon_base_scale",
                reason: format!("must be positive, got {}", self.placement.icon_base_scale),
            });
        }
        if !(self.exposure.min_exposure <= self.exposure.max_exposure) {
            return Err(ConfigError::Invalid {
                field: "exposure.min_exposure",
                reason: format!(
                    "must not exceed max_exposure ({} > {})",
                    self.exposure.min_exposure, self.exposure.max_exposure
                ),
            });
        }
        if !(self.interaction.min_drag_radius >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "interaction.min_drag_radius",
                reason: format!("must be non-negative, got {}", self.interaction.min_drag_radius),
            });
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            placement: PlacementConfig::default(),
            interaction: InteractionConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            rig_defaults: RigDefaults::default(),
            exposure: ExposureConfig::default(),
            overhead_camera: OverheadCameraConfig::default(),
        }
    }
}

fn parse_f32<F>(lookup: &F, key: &str) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse::<f32>().ok())
}

fn parse_usize<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|raw| raw.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.history_capacity, 30);
        assert_eq!(config.placement.ring_radius, 2.2);
        assert_eq!(config.interaction.min_drag_radius, 0.6);
        assert_eq!(config.rig_defaults.power, 1800.0);
        assert_eq!(config.rig_defaults.rotation_deg, -100.0);
        assert_eq!(config.exposure.base_exposure, 0.85);
    }

    #[test]
    fn test_ring_position_spirals() {
        let placement = PlacementConfig::default();
        assert_eq!(placement.ring_position(0), [2.2, 0.0]);

        let [x, z] = placement.ring_position(1);
        assert!((x - 0.9f32.cos() * 2.2).abs() < 1e-6);
        assert!((z - 0.9f32.sin() * 2.2).abs() < 1e-6);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            StudioConfig::from_json(r#"{ "interaction": { "min_drag_radius": 1.0 } }"#).unwrap();
        assert_eq!(config.interaction.min_drag_radius, 1.0);
        // Untouched sections keep their defaults
        assert_eq!(config.interaction.move_epsilon, DEFAULT_MOVE_EPSILON);
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_scale() {
        let result = StudioConfig::from_json(r#"{ "placement": { "icon_base_scale": 0.0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            StudioConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SOFTBOX_HISTORY_CAPACITY", "12"),
            ("SOFTBOX_MIN_DRAG_RADIUS", " 0.9 "),
            ("SOFTBOX_AIM_DISTANCE", "-1"),
            ("SOFTBOX_BASE_EXPOSURE", "nope"),
        ]);
        let config = StudioConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.history_capacity, 12);
        assert!((config.interaction.min_drag_radius - 0.9).abs() < f32::EPSILON);
        // Out-of-domain and unparsable values are ignored
        assert_eq!(config.placement.aim_distance, DEFAULT_AIM_DISTANCE);
        assert_eq!(config.exposure.base_exposure, DEFAULT_BASE_EXPOSURE);
    }
}
