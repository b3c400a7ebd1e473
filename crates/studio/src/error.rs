//! Error types for the studio core.

use softbox_ipc::{IpcError, RigId, RigKind};
use thiserror::Error;

use crate::assets::AssetError;

/// Main error type for studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Fixture geometry could not be loaded; no rig was created
    #[error("Failed to load geometry for {kind} rig: {source}")]
    GeometryLoad {
        kind: RigKind,
        #[source]
        source: AssetError,
    },

    #[error("No rig with id {0}")]
    UnknownRig(RigId),

    #[error("A rig with id {0} already exists")]
    DuplicateRig(RigId),

    #[error("Invalid rig color: {0}")]
    InvalidColor(#[from] IpcError),

    /// Scene payload rejected before anything was changed
    #[error("Malformed scene data: {0}")]
    MalformedScene(String),
}

impl StudioError {
    /// Short machine-readable code for UI error messages
    pub fn code(&self) -> &'static str {
        match self {
            StudioError::GeometryLoad { .. } => "geometry_load",
            StudioError::UnknownRig(_) => "unknown_rig",
            StudioError::DuplicateRig(_) => "duplicate_rig",
            StudioError::InvalidColor(_) => "invalid_color",
            StudioError::MalformedScene(_) => "malformed_scene",
        }
    }
}

/// Result type alias using the studio's error type.
pub type Result<T> = std::result::Result<T, StudioError>;
