//! Live-tunable parameters read by the compositor every frame.

use crate::colormap::ColormapName;
use crate::data::ModeComponent;
use num_traits::clamp;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Declared slider range for the vertical scale.
pub const SCALE_BOUNDS: (f64, f64) = (0.0, 40.0);
/// Declared slider range for the angular speed.
pub const SPEED_BOUNDS: (f64, f64) = (0.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub guided_on: bool,
    pub propagating_on: bool,
    pub evanescent_on: bool,
    pub scale: f64,
    pub speed: f64,
    pub colormap: ColormapName,
    pub wireframe: bool,
    pub playing: bool,
    /// Derived from the dataset's reference curve; never set by user input.
    #[serde(skip_deserializing)]
    pub colormax: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            guided_on: true,
            propagating_on: true,
            evanescent_on: true,
            scale: 10.0,
            speed: 2.0,
            colormap: ColormapName::Viridis,
            wireframe: false,
            playing: true,
            colormax: 1.0,
        }
    }
}

impl Parameters {
    pub fn with_colormax(colormax: f64) -> Self {
        Self {
            colormax,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, component: ModeComponent) -> bool {
        match component {
            ModeComponent::Guided => self.guided_on,
            ModeComponent::Propagating => self.propagating_on,
            ModeComponent::Evanescent => self.evanescent_on,
        }
    }

    pub fn set_component(&mut self, component: ModeComponent, enabled: bool) {
        match component {
            ModeComponent::Guided => self.guided_on = enabled,
            ModeComponent::Propagating => self.propagating_on = enabled,
            ModeComponent::Evanescent => self.evanescent_on = enabled,
        }
    }

    /// Clamps into `SCALE_BOUNDS`; non-finite input is ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = clamp(scale, SCALE_BOUNDS.0, SCALE_BOUNDS.1);
        }
    }

    /// Clamps into `SPEED_BOUNDS`; non-finite input is ignored.
    pub fn set_speed(&mut self, speed: f64) {
        if speed.is_finite() {
            self.speed = clamp(speed, SPEED_BOUNDS.0, SPEED_BOUNDS.1);
        }
    }

    /// Phase angle `speed * t` driving the field rotation.
    pub fn phase(&self, t: f64) -> f64 {
        self.speed * t
    }

    pub fn apply(&mut self, update: ParameterUpdate) {
        match update {
            ParameterUpdate::Component { component, enabled } => {
                self.set_component(component, enabled)
            }
            ParameterUpdate::Scale(value) => self.set_scale(value),
            ParameterUpdate::Speed(value) => self.set_speed(value),
            ParameterUpdate::Colormap(name) => {
                if name != self.colormap {
                    log::debug!("colormap {} -> {}", self.colormap, name);
                }
                self.colormap = name;
            }
            ParameterUpdate::Wireframe(on) => self.wireframe = on,
            ParameterUpdate::Playing(on) => self.playing = on,
        }
    }

    /// Overwrites the fields present in `patch`; absent fields keep their
    /// current values. Ranges are clamped and `colormax` is never touched.
    pub fn merge(&mut self, patch: &ParameterPatch) {
        if let Some(on) = patch.guided_on {
            self.guided_on = on;
        }
        if let Some(on) = patch.propagating_on {
            self.propagating_on = on;
        }
        if let Some(on) = patch.evanescent_on {
            self.evanescent_on = on;
        }
        if let Some(scale) = patch.scale {
            self.set_scale(scale);
        }
        if let Some(speed) = patch.speed {
            self.set_speed(speed);
        }
        if let Some(name) = patch.colormap {
            self.apply(ParameterUpdate::Colormap(name));
        }
        if let Some(on) = patch.wireframe {
            self.wireframe = on;
        }
        if let Some(on) = patch.playing {
            self.playing = on;
        }
    }
}

/// A possibly partial set of user-settable parameters, as sent by a host
/// restoring or scripting the panel. Unknown keys (including `colormax`)
/// are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterPatch {
    pub guided_on: Option<bool>,
    pub propagating_on: Option<bool>,
    pub evanescent_on: Option<bool>,
    pub scale: Option<f64>,
    pub speed: Option<f64>,
    pub colormap: Option<ColormapName>,
    pub wireframe: Option<bool>,
    pub playing: Option<bool>,
}

impl From<Parameters> for ParameterPatch {
    fn from(params: Parameters) -> Self {
        Self {
            guided_on: Some(params.guided_on),
            propagating_on: Some(params.propagating_on),
            evanescent_on: Some(params.evanescent_on),
            scale: Some(params.scale),
            speed: Some(params.speed),
            colormap: Some(params.colormap),
            wireframe: Some(params.wireframe),
            playing: Some(params.playing),
        }
    }
}

/// One input event from the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum ParameterUpdate {
    Component {
        component: ModeComponent,
        enabled: bool,
    },
    Scale(f64),
    Speed(f64),
    Colormap(ColormapName),
    Wireframe(bool),
    Playing(bool),
}

/// Handle shared by input callbacks and the frame loop. Readers take a
/// whole-struct snapshot, so a frame never observes a half-applied update.
#[derive(Debug, Clone, Default)]
pub struct SharedParameters {
    inner: Arc<RwLock<Parameters>>,
}

impl SharedParameters {
    pub fn new(params: Parameters) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    pub fn snapshot(&self) -> Parameters {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply(&self, update: ParameterUpdate) -> Parameters {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(update);
        *guard
    }

    pub fn merge(&self, patch: &ParameterPatch) -> Parameters {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.merge(patch);
        *guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn defaults_match_panel_defaults() {
        let params = Parameters::default();
        assert!(params.guided_on && params.propagating_on && params.evanescent_on);
        assert_eq!(params.scale, 10.0);
        assert_eq!(params.speed, 2.0);
        assert_eq!(params.colormap, ColormapName::Viridis);
        assert!(!params.wireframe);
        assert!(params.playing);
    }

    #[test]
    fn range_setters_clamp_and_ignore_non_finite() {
        let mut params = Parameters::default();
        params.set_scale(55.0);
        assert_eq!(params.scale, 40.0);
        params.set_scale(-1.0);
        assert_eq!(params.scale, 0.0);
        params.set_speed(12.5);
        assert_eq!(params.speed, 10.0);
        params.set_speed(f64::NAN);
        assert_eq!(params.speed, 10.0);
    }

    #[test]
    fn apply_routes_each_control() {
        let mut params = Parameters::with_colormax(0.3);
        params.apply(ParameterUpdate::Component {
            component: ModeComponent::Evanescent,
            enabled: false,
        });
        params.apply(ParameterUpdate::Colormap(ColormapName::Turbo));
        params.apply(ParameterUpdate::Wireframe(true));
        params.apply(ParameterUpdate::Speed(3.5));
        assert!(!params.is_enabled(ModeComponent::Evanescent));
        assert!(params.is_enabled(ModeComponent::Guided));
        assert_eq!(params.colormap, ColormapName::Turbo);
        assert!(params.wireframe);
        assert_eq!(params.speed, 3.5);
        assert_eq!(params.colormax, 0.3);
    }

    #[test]
    fn update_deserializes_from_panel_event() {
        let update: ParameterUpdate =
            serde_json::from_str(r#"{"control": "colormap", "value": "magma"}"#).unwrap();
        assert_eq!(update, ParameterUpdate::Colormap(ColormapName::Magma));

        let update: ParameterUpdate = serde_json::from_str(
            r#"{"control": "component", "value": {"component": "guided", "enabled": false}}"#,
        )
        .unwrap();
        assert_eq!(
            update,
            ParameterUpdate::Component {
                component: ModeComponent::Guided,
                enabled: false
            }
        );
    }

    #[test]
    fn merge_keeps_colormax_and_clamps() {
        let shared = SharedParameters::new(Parameters::with_colormax(0.75));
        let incoming: ParameterPatch =
            serde_json::from_str(r#"{"scale": 100.0, "colormap": "jet", "colormax": 9.0}"#)
                .unwrap();
        let merged = shared.merge(&incoming);
        assert_eq!(merged.colormax, 0.75);
        assert_eq!(merged.scale, 40.0);
        assert_eq!(merged.colormap, ColormapName::Jet);
        assert_eq!(merged.speed, 2.0);
    }

    #[test]
    fn partial_merge_leaves_absent_fields_alone() {
        let mut params = Parameters::with_colormax(0.5);
        params.apply(ParameterUpdate::Colormap(ColormapName::Jet));
        params.apply(ParameterUpdate::Speed(7.0));
        params.apply(ParameterUpdate::Playing(false));
        params.apply(ParameterUpdate::Component {
            component: ModeComponent::Propagating,
            enabled: false,
        });
        let before = params;

        let patch: ParameterPatch = serde_json::from_str(r#"{"scale": 5.0}"#).unwrap();
        assert_eq!(patch.playing, None);
        params.merge(&patch);
        assert_eq!(params, Parameters { scale: 5.0, ..before });

        params.merge(&ParameterPatch::default());
        assert_eq!(params, Parameters { scale: 5.0, ..before });
    }

    #[test]
    fn full_patch_replaces_every_user_field() {
        let mut params = Parameters::with_colormax(0.5);
        let target = Parameters {
            guided_on: false,
            scale: 3.0,
            speed: 0.5,
            colormap: ColormapName::Plasma,
            wireframe: true,
            playing: false,
            ..Parameters::with_colormax(9.0)
        };
        params.merge(&ParameterPatch::from(target));
        assert_eq!(params, Parameters { colormax: 0.5, ..target });
    }

    #[test]
    fn snapshots_see_whole_updates_across_threads() {
        let shared = SharedParameters::new(Parameters::default());
        let writer = {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let on = i % 2 == 0;
                    shared.merge(&ParameterPatch {
                        guided_on: Some(on),
                        propagating_on: Some(on),
                        evanescent_on: Some(on),
                        ..ParameterPatch::default()
                    });
                }
            })
        };
        for _ in 0..200 {
            let snap = shared.snapshot();
            assert_eq!(snap.guided_on, snap.propagating_on);
            assert_eq!(snap.propagating_on, snap.evanescent_on);
        }
        writer.join().expect("writer thread");
    }
}
