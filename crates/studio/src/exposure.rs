//! Photometric exposure model.
//!
//! Turns camera-like settings into the renderer's tone-mapping exposure and
//! the depth-of-field pass parameters. The only state is the
//! maintain-exposure latch, which freezes brightness while the photographic
//! inputs keep changing.

use softbox_config::ExposureConfig;
use softbox_ipc::{CameraSettings, ExposureInfo};
use tracing::{debug, warn};

/// Exposure value at ISO 100
pub fn compute_ev100(iso: f32, f_number: f32, shutter_seconds: f32) -> f32 {
    (f_number * f_number / shutter_seconds).log2() - (iso / 100.0).log2()
}

/// Renderer exposure for an EV before clamping
pub fn unclamped_exposure(config: &ExposureConfig, ev100: f32, compensation_stops: f32) -> f32 {
    config.base_exposure * (-(ev100 - config.reference_ev)).exp2() * compensation_stops.exp2()
}

/// Renderer exposure for an EV, clamped to the configured range
pub fn exposure_from_ev_with(config: &ExposureConfig, ev100: f32, compensation_stops: f32) -> f32 {
    unclamped_exposure(config, ev100, compensation_stops)
        .max(config.min_exposure)
        .min(config.max_exposure)
}

/// [`exposure_from_ev_with`] using the default curve (base 0.85, EV 10)
pub fn exposure_from_ev(ev100: f32, compensation_stops: f32) -> f32 {
    exposure_from_ev_with(&ExposureConfig::default(), ev100, compensation_stops)
}

/// Bokeh pass parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfField {
    pub aperture: f32,
    pub max_blur: f32,
}

impl Default for DepthOfField {
    fn default() -> Self {
        depth_of_field(CameraSettings::default().f_number)
    }
}

/// Depth of field for an f-number; wider apertures blur more
pub fn depth_of_field(f_number: f32) -> DepthOfField {
    let inverse = 1.0 / f_number;
    DepthOfField {
        aperture: (0.00001 * inverse * inverse).clamp(0.00001, 0.001),
        max_blur: (0.005 + inverse * 0.01).clamp(0.005, 0.03),
    }
}

/// Shutter time as shown to the user: `1/125`, or `0.800s` for slow speeds
pub fn format_shutter(shutter_seconds: f32) -> String {
    let inverse = (1.0 / shutter_seconds).round();
    if inverse.is_finite() && inverse >= 2.0 {
        format!("1/{}", inverse as i64)
    } else {
        format!("{shutter_seconds:.3}s")
    }
}

/// Result of one exposure recompute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureReadout {
    pub settings: CameraSettings,
    pub ev100: f32,
    /// Exposure applied to the renderer
    pub exposure: f32,
    pub locked: bool,
    pub depth_of_field: DepthOfField,
}

impl ExposureReadout {
    /// Display strings for the camera panel
    pub fn to_info(&self) -> ExposureInfo {
        let settings = &self.settings;
        ExposureInfo {
            ev100: self.ev100,
            exposure: self.exposure,
            locked: self.locked,
            iso_text: format!("{:.0}", settings.iso),
            f_number_text: format!("{:.1}", settings.f_number),
            shutter_text: format_shutter(settings.shutter_seconds),
            compensation_text: format!("{:.1}", settings.exposure_compensation_stops),
            ev_text: format!("{:.2}", self.ev100),
            exposure_text: format!("{:.3}", self.exposure),
        }
    }
}

/// Camera settings plus the latch and the exposure last sent to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureModel {
    config: ExposureConfig,
    settings: CameraSettings,
    locked_exposure: Option<f32>,
    renderer_exposure: f32,
    depth_of_field: DepthOfField,
}

impl ExposureModel {
    pub fn new(config: ExposureConfig) -> Self {
        let mut model = Self {
            renderer_exposure: config.initial_exposure,
            config,
            settings: CameraSettings::default(),
            locked_exposure: None,
            depth_of_field: DepthOfField::default(),
        };
        model.recompute();
        model
    }

    pub fn settings(&self) -> CameraSettings {
        self.settings
    }

    pub fn renderer_exposure(&self) -> f32 {
        self.renderer_exposure
    }

    /// Exposure frozen by the latch, if engaged
    pub fn locked_exposure(&self) -> Option<f32> {
        self.locked_exposure
    }

    pub fn depth_of_field(&self) -> DepthOfField {
        self.depth_of_field
    }

    pub fn set_settings(&mut self, settings: CameraSettings) -> ExposureReadout {
        self.settings = settings;
        self.recompute()
    }

    pub fn set_iso(&mut self, iso: f32) -> ExposureReadout {
        self.settings.iso = iso;
        self.recompute()
    }

    pub fn set_f_number(&mut self, f_number: f32) -> ExposureReadout {
        self.settings.f_number = f_number;
        self.recompute()
    }

    pub fn set_shutter(&mut self, shutter_seconds: f32) -> ExposureReadout {
        self.settings.shutter_seconds = shutter_seconds;
        self.recompute()
    }

    pub fn set_compensation(&mut self, stops: f32) -> ExposureReadout {
        self.settings.exposure_compensation_stops = stops;
        self.recompute()
    }

    pub fn set_maintain_exposure(&mut self, maintain: bool) -> ExposureReadout {
        if maintain != self.settings.maintain_exposure {
            debug!("Maintain exposure {}", if maintain { "on" } else { "off" });
        }
        self.settings.maintain_exposure = maintain;
        self.recompute()
    }

    /// Back to the default settings with the latch released
    pub fn reset(&mut self) -> ExposureReadout {
        self.settings = CameraSettings::default();
        self.locked_exposure = None;
        self.recompute()
    }

    /// Derive the renderer exposure and depth of field from the settings.
    ///
    /// With the latch engaged the exposure stays at the value captured when
    /// it was engaged; depth of field always follows the f-number.
    pub fn recompute(&mut self) -> ExposureReadout {
        let s = self.settings;
        let ev100 = compute_ev100(s.iso, s.f_number, s.shutter_seconds);

        if s.maintain_exposure {
            let locked = *self.locked_exposure.get_or_insert(self.renderer_exposure);
            self.renderer_exposure = locked;
        } else {
            self.locked_exposure = None;
            let raw = unclamped_exposure(&self.config, ev100, s.exposure_compensation_stops);
            if raw.is_nan() {
                warn!(
                    "Undefined exposure for iso {} f/{} {}s, keeping {}",
                    s.iso, s.f_number, s.shutter_seconds, self.renderer_exposure
                );
            } else {
                self.renderer_exposure = raw.max(self.config.min_exposure).min(self.config.max_exposure);
            }
        }

        let dof = depth_of_field(s.f_number);
        if dof.aperture.is_finite() && dof.max_blur.is_finite() {
            self.depth_of_field = dof;
        }

        ExposureReadout {
            settings: s,
            ev100,
            exposure: self.renderer_exposure,
            locked: self.locked_exposure.is_some(),
            depth_of_field: self.depth_of_field,
        }
    }
}
