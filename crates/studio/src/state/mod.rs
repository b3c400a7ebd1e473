//! The studio context object.
//!
//! [`StudioState`] owns every rig, the selection, the undo log, the pointer
//! interaction and the exposure model. All mutations go through it on one
//! logical thread; the only suspension points are geometry loads.

mod commands;
mod persistence;
mod pointer;
mod rigs;
mod undo;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;
use softbox_config::StudioConfig;
use softbox_ipc::{CameraSettings, RigId, StudioToUi};
use tracing::debug;

use crate::exposure::{ExposureModel, ExposureReadout};
use crate::frame::{FrameParams, SpotLightRaw};
use crate::history::UndoLog;
use crate::interaction::Interaction;
use crate::picking::{OverheadCamera, Viewport};
use crate::rig::LightRig;

pub use rigs::LoadedRig;

/// Messages waiting to be delivered to the UI
#[derive(Debug, Default)]
pub struct OutboundUiMessages {
    pub messages: Vec<StudioToUi>,
}

impl OutboundUiMessages {
    /// Queue a message to be sent to the UI
    pub fn send(&mut self, msg: StudioToUi) {
        self.messages.push(msg);
    }

    /// Take all queued messages, leaving the queue empty
    pub fn drain(&mut self) -> Vec<StudioToUi> {
        std::mem::take(&mut self.messages)
    }
}

/// Hands out `L` + 6 hex digit rig ids
#[derive(Debug, Default)]
pub struct RigIdGenerator {
    next_id: u32,
}

impl RigIdGenerator {
    const ID_SPACE: u32 = 0x100_0000;

    /// Next id for which `taken` is false
    pub fn next(&mut self, taken: impl Fn(&RigId) -> bool) -> RigId {
        loop {
            self.next_id = (self.next_id + 1) % Self::ID_SPACE;
            let id = RigId::new(format!("L{:06X}", self.next_id));
            if !taken(&id) {
                return id;
            }
        }
    }
}

/// Everything the studio core knows about one scene
#[derive(Debug)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct StudioState {
    config: StudioConfig,
    rigs: Vec<LightRig>,
    selected: Option<RigId>,
    history: UndoLog,
    interaction: Interaction,
    exposure: ExposureModel,
    overhead_camera: OverheadCamera,
    viewport: Viewport,
    ids: RigIdGenerator,
    outbound: OutboundUiMessages,
}

impl Default for StudioState {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl StudioState {
    pub fn new(config: StudioConfig) -> Self {
        Self {
            history: UndoLog::new(config.history_capacity),
            exposure: ExposureModel::new(config.exposure.clone()),
            overhead_camera: OverheadCamera::from_config(&config.overhead_camera),
            viewport: Viewport::new(1.0, 1.0),
            rigs: Vec::new(),
            selected: None,
            interaction: Interaction::default(),
            ids: RigIdGenerator::default(),
            outbound: OutboundUiMessages::default(),
            config,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Rigs in creation (completion) order
    pub fn rigs(&self) -> &[LightRig] {
        &self.rigs
    }

    pub fn rig(&self, id: &RigId) -> Option<&LightRig> {
        self.rigs.iter().find(|r| r.id() == id)
    }

    pub(crate) fn rig_mut(&mut self, id: &RigId) -> Option<&mut LightRig> {
        self.rigs.iter_mut().find(|r| r.id() == id)
    }

    pub fn selected(&self) -> Option<&RigId> {
        self.selected.as_ref()
    }

    pub fn selected_rig(&self) -> Option<&LightRig> {
        self.selected.as_ref().and_then(|id| self.rig(id))
    }

    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn exposure(&self) -> &ExposureModel {
        &self.exposure
    }

    pub fn overhead_camera(&self) -> &OverheadCamera {
        &self.overhead_camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the overhead canvas; the camera aspect follows
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.overhead_camera.set_aspect(viewport.aspect());
    }

    /// Apply new camera settings and tell the UI the resulting readout
    pub fn update_camera(&mut self, settings: CameraSettings) -> ExposureReadout {
        let readout = self.exposure.set_settings(settings);
        self.outbound
            .send(StudioToUi::ExposureChanged(readout.to_info()));
        readout
    }

    /// Render inputs for the current frame
    pub fn frame(&self) -> FrameParams {
        FrameParams {
            spots: self.rigs.iter().map(SpotLightRaw::from).collect(),
            exposure: self.exposure.renderer_exposure(),
            depth_of_field: self.exposure.depth_of_field(),
        }
    }

    /// Take all queued UI messages
    pub fn drain_outbound(&mut self) -> Vec<StudioToUi> {
        self.outbound.drain()
    }

    /// Select one rig, or none.
    ///
    /// Every rig's selection ring opacity is updated and the UI is asked to
    /// rebuild its controls. An unknown id clears the selection.
    pub fn select_rig(&mut self, id: Option<&RigId>) {
        self.selected = id.filter(|id| self.rig(id).is_some()).cloned();

        let interaction = &self.config.interaction;
        for rig in &mut self.rigs {
            let opacity = if Some(rig.id()) == self.selected.as_ref() {
                interaction.selected_opacity
            } else {
                interaction.unselected_opacity
            };
            rig.set_indicator_opacity(opacity);
        }

        debug!("Selected rig {:?}", self.selected);
        self.notify_controls();
    }

    pub(crate) fn notify_controls(&mut self) {
        let rigs = self
            .rigs
            .iter()
            .map(|r| r.controls(Some(r.id()) == self.selected.as_ref()))
            .collect();
        self.outbound.send(StudioToUi::ControlsChanged {
            rigs,
            selected: self.selected.clone(),
        });
    }

    pub(crate) fn notify_history(&mut self) {
        self.outbound.send(StudioToUi::UndoAvailability {
            can_undo: self.history.can_undo(),
            depth: self.history.len(),
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use softbox_ipc::RigKind;
    use tokio::sync::oneshot;

    use crate::assets::{asset_path, AssetError, GeometryLoader, MemoryLoader, RigGeometry};

    /// Loader whose every load fails
    pub struct FailingLoader;

    impl GeometryLoader for FailingLoader {
        fn load(&self, path: &str) -> impl Future<Output = Result<RigGeometry, AssetError>> + Send {
            let err = AssetError::Loader {
                path: path.to_string(),
                message: "network unreachable".to_string(),
            };
            async move { Err(err) }
        }
    }

    /// Loader that holds chosen kinds back until their gate is opened
    pub struct GatedLoader {
        inner: MemoryLoader,
        gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl GatedLoader {
        pub fn new() -> Self {
            Self {
                inner: MemoryLoader::with_default_fixtures(),
                gates: Mutex::new(HashMap::new()),
            }
        }

        /// Hold loads of `kind` until the returned sender fires
        pub fn gate(&self, kind: RigKind) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .insert(asset_path(kind).to_string(), rx);
            tx
        }
    }

    impl GeometryLoader for GatedLoader {
        fn load(&self, path: &str) -> impl Future<Output = Result<RigGeometry, AssetError>> + Send {
            let gate = self.gates.lock().unwrap().remove(path);
            let load = self.inner.load(path);
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                load.await
            }
        }
    }
}
