//! IPC message protocol for Softbox
//!
//! Defines the wire types exchanged between the studio core, the UI that
//! renders rig controls, and whatever persists scenes:
//! - [`RigSnapshot`] / [`SceneState`] - the persisted scene shape
//! - [`StudioToUi`] / [`UiToStudio`] - notifications and commands
//! - [`CameraSettings`] / [`SceneCamera`] - photographic exposure inputs, live and stored

mod error;
mod messages;
mod types;

pub use error::IpcError;
pub use messages::*;
pub use types::*;
