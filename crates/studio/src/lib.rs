//! Softbox studio core - light rigs, interaction and exposure
//!
//! This crate provides the engine-independent core of the virtual photo studio:
//! - [`rig::LightRig`] - A fixture with its holder, emitter and spotlight
//! - [`placement`] - Emitter placement solver for each fixture profile
//! - [`picking`] - Overhead camera rays and layered hit testing
//! - [`history::UndoLog`] - Bounded undo log of add/remove/move actions
//! - [`exposure::ExposureModel`] - Photographic exposure and depth of field
//! - [`frame::SpotLightRaw`] - Spotlight data (GPU-compatible with bytemuck)
//! - [`state::StudioState`] - The context object that ties it all together

pub mod assets;
pub mod error;
pub mod exposure;
pub mod frame;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod picking;
pub mod placement;
pub mod rig;
pub mod state;

pub use assets::{AssetError, GeometryLoader, MemoryLoader, RigGeometry};
pub use error::{Result, StudioError};
pub use exposure::{DepthOfField, ExposureModel, ExposureReadout};
pub use frame::{FrameParams, SpotLightRaw};
pub use history::{Action, UndoLog};
pub use rig::{LightRig, SpotParams};
pub use state::{LoadedRig, OutboundUiMessages, StudioState};

pub use softbox_config as config;
pub use softbox_ipc as ipc;
