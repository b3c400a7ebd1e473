//! Type definitions for IPC messages.

mod camera;
mod rig;
mod scene;

pub use camera::*;
pub use rig::*;
pub use scene::*;
