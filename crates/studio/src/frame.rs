//! Per-frame render inputs.

use crate::exposure::DepthOfField;
use crate::rig::{LightRig, SpotParams};

/// GPU-ready spotlight.
///
/// This struct is designed for GPU compatibility with bytemuck.
/// 16 floats, no implicit padding.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct SpotLightRaw {
    /// World-space emitter position
    pub position: [f32; 3],
    pub range: f32,
    /// Normalized world-space aim direction
    pub direction: [f32; 3],
    pub intensity: f32,
    /// Linear RGB
    pub color: [f32; 3],
    /// Cosine of the cone half-angle
    pub cos_outer: f32,
    /// Cosine of the angle where the penumbra falloff starts
    pub cos_inner: f32,
    pub decay: f32,
    pub _padding: [f32; 2],
}

impl From<&SpotParams> for SpotLightRaw {
    fn from(spot: &SpotParams) -> Self {
        let direction = (spot.target - spot.position).normalize_or_zero();
        Self {
            position: spot.position.to_array(),
            range: spot.range,
            direction: direction.to_array(),
            intensity: spot.intensity,
            color: spot.color.map(srgb_to_linear),
            cos_outer: spot.angle.cos(),
            cos_inner: (spot.angle * (1.0 - spot.penumbra)).cos(),
            decay: spot.decay,
            _padding: [0.0; 2],
        }
    }
}

impl From<&LightRig> for SpotLightRaw {
    fn from(rig: &LightRig) -> Self {
        Self::from(&rig.spot())
    }
}

/// Everything the renderer needs from the studio for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub spots: Vec<SpotLightRaw>,
    /// Tone-mapping exposure
    pub exposure: f32,
    pub depth_of_field: DepthOfField,
}

impl FrameParams {
    /// Spot lights as raw bytes for a storage buffer upload
    pub fn spot_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spots)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
