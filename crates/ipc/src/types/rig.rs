//! Light rig types shared with the UI and scene persistence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Fixture profile of a light rig.
///
/// Each profile has its own geometry asset and its own emitter placement
/// constants. The wire names are the short codes used by saved scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RigKind {
    /// Long rectangular softbox
    L1,
    /// Rectangular softbox
    L2,
    /// Square softbox
    L3,
    /// Small round studio flash
    L5,
}

impl RigKind {
    /// All fixture profiles, in menu order
    pub const ALL: [RigKind; 4] = [RigKind::L1, RigKind::L2, RigKind::L3, RigKind::L5];

    /// Short wire code (`"L1"`, ...)
    pub fn code(&self) -> &'static str {
        match self {
            RigKind::L1 => "L1",
            RigKind::L2 => "L2",
            RigKind::L3 => "L3",
            RigKind::L5 => "L5",
        }
    }

    /// Human readable name shown on the rig's control module
    pub fn display_name(&self) -> &'static str {
        match self {
            RigKind::L1 => "Long Rect Softbox",
            RigKind::L2 => "Rect Softbox",
            RigKind::L3 => "Square Softbox",
            RigKind::L5 => "Small Round Light",
        }
    }
}

impl fmt::Display for RigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for RigKind {
    type Err = IpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RigKind::ALL
            .into_iter()
            .find(|kind| kind.code() == s)
            .ok_or_else(|| IpcError::InvalidFormat(format!("unknown rig kind {s:?}")))
    }
}

/// Opaque, stable identifier of a light rig
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RigId(String);

impl RigId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RigId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Horizontal placement on the studio floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundPos {
    pub x: f32,
    pub z: f32,
}

impl GroundPos {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Distance to another ground position
    pub fn distance(&self, other: &GroundPos) -> f32 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

/// Serializable projection of a rig, enough to recreate it.
///
/// Every field is required; a snapshot with a missing field fails to
/// deserialize instead of being patched up with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RigSnapshot {
    pub id: RigId,
    pub kind: RigKind,
    pub pos: GroundPos,
    pub power: f32,
    pub size: f32,
    pub rotate_deg: f32,
    /// Hex color string (`#rrggbb`)
    pub color: String,
}

impl RigSnapshot {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Axis of the per-rig emitter anchor editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorAxis {
    X,
    Y,
    Z,
}

impl AnchorAxis {
    /// Editable range of the anchor along this axis, in holder-local units
    pub fn range(&self) -> (f32, f32) {
        match self {
            AnchorAxis::X => (-0.5, 0.5),
            AnchorAxis::Y => (-0.5, 1.5),
            AnchorAxis::Z => (-0.5, 0.5),
        }
    }

    /// Clamp a value into this axis' editable range
    pub fn clamp(&self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

/// Everything the UI needs to build one rig's control module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigControls {
    pub snapshot: RigSnapshot,
    pub display_name: String,
    pub selected: bool,
    /// Opacity of the selection ring drawn under the fixture
    pub indicator_opacity: f32,
    /// Emitter anchor in the fixture's local frame
    pub emitter_anchor: [f32; 3],
}

/// Parse a `#rgb` or `#rrggbb` color into sRGB components (0.0-1.0).
///
/// The leading `#` is optional.
pub fn parse_hex_color(hex: &str) -> Result<[f32; 3], IpcError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || IpcError::InvalidColor(hex.to_string());

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    let bytes = match digits.len() {
        3 => {
            let mut out = [0u8; 3];
            for (i, c) in digits.chars().enumerate() {
                let nibble = channel(&c.to_string())?;
                out[i] = nibble * 17;
            }
            out
        }
        6 => [
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ],
        _ => return Err(invalid()),
    };

    Ok(bytes.map(|b| b as f32 / 255.0))
}

/// Canonical lower-case `#rrggbb` form of a color string
pub fn normalize_hex_color(hex: &str) -> Result<String, IpcError> {
    let [r, g, b] = parse_hex_color(hex)?;
    let to_byte = |c: f32| (c * 255.0).round() as u8;
    Ok(format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b)))
}
