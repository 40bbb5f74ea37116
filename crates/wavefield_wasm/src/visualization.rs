//! WASM wrapper around the core visualization.
//!
//! Timestamps cross the boundary in milliseconds (`performance.now()` and
//! `requestAnimationFrame` both use them); the core works in seconds.

use crate::ticker::AnimationFrameTicker;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wavefield_core::colormap::{ColormapName, ColormapSet, RawColormaps};
use wavefield_core::data::{DataStore, ModeComponent, RawDataset};
use wavefield_core::params::{ParameterPatch, ParameterUpdate};
use wavefield_core::traits::Ticker;
use wavefield_core::view::SceneLayout;
use wavefield_core::Visualization;

fn seconds(now_ms: f64) -> f64 {
    now_ms / 1000.0
}

fn parse_component(name: &str) -> Result<ModeComponent, JsValue> {
    ModeComponent::ALL
        .into_iter()
        .find(|component| component.name() == name)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown field component: {name}")))
}

fn init_logging() {
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    {
        // Fails harmlessly when a second visualization is constructed.
        console_log::init_with_level(log::Level::Info).ok();
    }
}

#[wasm_bindgen]
pub struct WasmVisualization {
    viz: Rc<RefCell<Visualization>>,
    ticker: Option<AnimationFrameTicker>,
}

impl WasmVisualization {
    fn wrap(viz: Visualization) -> Self {
        Self {
            viz: Rc::new(RefCell::new(viz)),
            ticker: None,
        }
    }

    fn sync_ticker(&mut self, running: bool) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.follow(running);
        }
    }

    fn update(&mut self, update: ParameterUpdate, now_ms: f64) {
        let running = self.viz.borrow_mut().apply(update, seconds(now_ms));
        self.sync_ticker(running);
    }

    fn merge_parameters(&mut self, patch: &ParameterPatch, now_ms: f64) {
        let running = self
            .viz
            .borrow_mut()
            .set_parameters(patch, seconds(now_ms));
        self.sync_ticker(running);
    }
}

#[wasm_bindgen]
impl WasmVisualization {
    /// Builds from JS objects shaped like the dataset and colormap JSON files.
    #[wasm_bindgen(constructor)]
    pub fn new(
        dataset: JsValue,
        colormaps: JsValue,
        layout: JsValue,
        now_ms: f64,
    ) -> Result<WasmVisualization, JsValue> {
        init_logging();

        let raw: RawDataset = serde_wasm_bindgen::from_value(dataset)
            .map_err(|e| JsValue::from_str(&format!("Invalid dataset: {e}")))?;
        let raw_colormaps: RawColormaps = serde_wasm_bindgen::from_value(colormaps)
            .map_err(|e| JsValue::from_str(&format!("Invalid colormaps: {e}")))?;
        let layout: SceneLayout = if layout.is_undefined() || layout.is_null() {
            SceneLayout::default()
        } else {
            serde_wasm_bindgen::from_value(layout)
                .map_err(|e| JsValue::from_str(&format!("Invalid scene layout: {e}")))?
        };

        let store = DataStore::from_raw(&raw).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let colormaps =
            ColormapSet::from_raw(&raw_colormaps).map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self::wrap(Visualization::new(
            store,
            colormaps,
            layout,
            seconds(now_ms),
        )))
    }

    /// Builds from JSON text with the default scene layout.
    pub fn from_json(
        dataset_json: &str,
        colormaps_json: &str,
        now_ms: f64,
    ) -> Result<WasmVisualization, JsValue> {
        init_logging();
        let viz = Visualization::from_json(dataset_json, colormaps_json, seconds(now_ms))
            .map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
        Ok(Self::wrap(viz))
    }

    /// Drives `frame` from `requestAnimationFrame`, invoking `on_frame(now_ms)`
    /// after each composition so the renderer can upload buffers and draw.
    pub fn run(&mut self, on_frame: js_sys::Function) {
        let viz = Rc::clone(&self.viz);
        let mut ticker = AnimationFrameTicker::new(move |now_ms| {
            viz.borrow_mut().frame(seconds(now_ms));
            if let Err(err) = on_frame.call1(&JsValue::NULL, &JsValue::from_f64(now_ms)) {
                log::error!("frame callback failed: {err:?}");
            }
        });
        ticker.follow(self.viz.borrow().clock().is_running());
        // Replacing an earlier ticker drops it, which cancels its pending frame.
        self.ticker = Some(ticker);
    }

    /// Stops the animation-frame loop without pausing the clock.
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Advances to `now_ms` and recomposes; returns the animation time in seconds.
    pub fn frame(&mut self, now_ms: f64) -> f64 {
        let mut viz = self.viz.borrow_mut();
        viz.frame(seconds(now_ms));
        viz.clock().elapsed()
    }

    pub fn vertex_count(&self) -> usize {
        self.viz.borrow().store().vertex_count()
    }

    pub fn positions(&self) -> Vec<f32> {
        self.viz.borrow().buffers().positions.clone()
    }

    pub fn colors(&self) -> Vec<f32> {
        self.viz.borrow().buffers().colors.clone()
    }

    pub fn normals(&self) -> Vec<f32> {
        self.viz.borrow().normals().to_vec()
    }

    pub fn indices(&self) -> Vec<u32> {
        self.viz.borrow().indices().to_vec()
    }

    pub fn curve_points(&self) -> Vec<f32> {
        self.viz.borrow().curve_points().to_vec()
    }

    pub fn elapsed(&self) -> f64 {
        self.viz.borrow().clock().elapsed()
    }

    pub fn is_playing(&self) -> bool {
        self.viz.borrow().clock().is_running()
    }

    pub fn wireframe(&self) -> bool {
        self.viz.borrow().parameters().snapshot().wireframe
    }

    pub fn set_component(
        &mut self,
        component: &str,
        enabled: bool,
        now_ms: f64,
    ) -> Result<(), JsValue> {
        let component = parse_component(component)?;
        self.update(ParameterUpdate::Component { component, enabled }, now_ms);
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64, now_ms: f64) {
        self.update(ParameterUpdate::Scale(scale), now_ms);
    }

    pub fn set_speed(&mut self, speed: f64, now_ms: f64) {
        self.update(ParameterUpdate::Speed(speed), now_ms);
    }

    pub fn set_colormap(&mut self, name: &str, now_ms: f64) -> Result<(), JsValue> {
        let name: ColormapName = name
            .parse()
            .map_err(|e: anyhow::Error| JsValue::from_str(&e.to_string()))?;
        self.update(ParameterUpdate::Colormap(name), now_ms);
        Ok(())
    }

    pub fn set_wireframe(&mut self, on: bool, now_ms: f64) {
        self.update(ParameterUpdate::Wireframe(on), now_ms);
    }

    /// Play/pause. Pausing cancels the pending animation frame; resuming
    /// restores the phase captured at the pause.
    pub fn set_playing(&mut self, playing: bool, now_ms: f64) {
        self.update(ParameterUpdate::Playing(playing), now_ms);
    }

    /// Applies one `{control, value}` panel event.
    pub fn apply_update(&mut self, update: JsValue, now_ms: f64) -> Result<(), JsValue> {
        let update: ParameterUpdate = serde_wasm_bindgen::from_value(update)
            .map_err(|e| JsValue::from_str(&format!("Invalid parameter update: {e}")))?;
        self.update(update, now_ms);
        Ok(())
    }

    /// Sets the parameters present in a (possibly partial) object; absent
    /// keys keep their current values.
    pub fn set_parameters(&mut self, params: JsValue, now_ms: f64) -> Result<(), JsValue> {
        let patch: ParameterPatch = serde_wasm_bindgen::from_value(params)
            .map_err(|e| JsValue::from_str(&format!("Invalid parameters: {e}")))?;
        self.merge_parameters(&patch, now_ms);
        Ok(())
    }

    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        let params = self.viz.borrow().parameters().snapshot();
        serde_wasm_bindgen::to_value(&params)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize parameters: {e}")))
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.viz.borrow_mut().resize(width, height)
    }

    pub fn projection_matrix(&self) -> Vec<f32> {
        self.viz.borrow().projection().column_major()
    }

    pub fn view_matrix(&self) -> Vec<f32> {
        self.viz
            .borrow()
            .layout()
            .view_matrix()
            .iter()
            .map(|&v| v as f32)
            .collect()
    }

    pub fn mesh_transform(&self) -> Vec<f32> {
        self.viz
            .borrow()
            .layout()
            .mesh_transform()
            .iter()
            .map(|&v| v as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset_json() -> &'static str {
        r#"{
            "positions": [0, 0, 0, 1, 0, 0, 0, 0, 1],
            "triangles": [0, 1, 2],
            "guided": [[1, 0], [0, 1], [-1, 0]],
            "propagating": [[0, 0], [0, 0], [0, 0]],
            "evanescent": [[0, 0], [0, 0], [0, 0]],
            "curve_x": [0, 1, 2],
            "curve_y": [0, 1, 0.5]
        }"#
    }

    fn colormaps_json() -> String {
        let table = format!("[{}]", vec!["[0.2, 0.4, 0.6]"; 256].join(","));
        let body = ["viridis", "magma", "inferno", "plasma", "twilight", "turbo", "jet"]
            .iter()
            .map(|name| format!("\"{name}\": {table}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{{{body}}}")
    }

    fn build() -> WasmVisualization {
        WasmVisualization::from_json(dataset_json(), &colormaps_json(), 1000.0)
            .expect("visualization should build")
    }

    #[test]
    fn exposes_buffers_for_the_renderer() {
        let viz = build();
        assert_eq!(viz.vertex_count(), 3);
        assert_eq!(viz.positions().len(), 9);
        assert_eq!(viz.colors().len(), 9);
        assert_eq!(viz.normals().len(), 9);
        assert_eq!(viz.indices(), vec![0, 1, 2]);
        assert_eq!(viz.curve_points().len(), 9);
        assert_eq!(viz.positions()[1], 10.0);
    }

    #[test]
    fn frame_converts_milliseconds() {
        let mut viz = build();
        let t = viz.frame(1500.0);
        assert!((t - 0.5).abs() < 1e-12);
        assert!(viz.is_playing());
    }

    #[test]
    fn setters_reach_the_next_frame() {
        let mut viz = build();
        viz.set_scale(2.0, 1000.0);
        viz.set_component("guided", false, 1000.0).expect("known component");
        viz.set_wireframe(true, 1000.0);
        viz.frame(1000.0);
        assert!(viz.positions().iter().skip(1).step_by(3).all(|&y| y == 0.0));
        assert!(viz.wireframe());

        viz.set_component("guided", true, 1000.0).expect("known component");
        viz.frame(1000.0);
        assert_eq!(viz.positions()[1], 2.0);
    }

    #[test]
    fn play_pause_without_ticker() {
        let mut viz = build();
        viz.frame(1250.0);
        viz.set_playing(false, 1500.0);
        assert!(!viz.is_playing());
        viz.frame(4000.0);
        assert!((viz.elapsed() - 0.5).abs() < 1e-12);
        viz.set_playing(true, 9000.0);
        assert!((viz.frame(9250.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn resize_updates_projection_matrix() {
        let mut viz = build();
        assert!(viz.resize(200, 100));
        let wide = viz.projection_matrix();
        assert!(viz.resize(100, 100));
        let square = viz.projection_matrix();
        assert_eq!(wide.len(), 16);
        assert!((square[0] - 2.0 * wide[0]).abs() < 1e-5);
        assert_eq!(viz.mesh_transform()[14], -4.0);
        assert_eq!(viz.view_matrix().len(), 16);
    }

    #[cfg(target_arch = "wasm32")]
    mod browser {
        use super::*;
        use wasm_bindgen_test::wasm_bindgen_test;

        fn patch(entries: &[(&str, JsValue)]) -> JsValue {
            let object = js_sys::Object::new();
            for (key, value) in entries {
                js_sys::Reflect::set(&object, &JsValue::from_str(key), value)
                    .expect("set property");
            }
            object.into()
        }

        #[wasm_bindgen_test]
        fn rejects_unknown_component_and_colormap() {
            let mut viz = build();
            assert!(viz.set_component("radiating", true, 0.0).is_err());
            assert!(viz.set_colormap("rainbow", 0.0).is_err());
            assert!(viz.set_colormap("turbo", 0.0).is_ok());
        }

        #[wasm_bindgen_test]
        fn rejects_malformed_dataset() {
            let bad = dataset_json().replace("[0, 1, 2]", "[0, 1, 5]");
            assert!(WasmVisualization::from_json(&bad, &colormaps_json(), 0.0).is_err());
        }

        #[wasm_bindgen_test]
        fn partial_parameters_do_not_resume() {
            let mut viz = build();
            viz.set_speed(7.0, 1000.0);
            viz.set_playing(false, 1000.0);
            viz.set_parameters(patch(&[("scale", JsValue::from_f64(5.0))]), 2000.0)
                .expect("partial parameters");
            assert!(!viz.is_playing());
            viz.frame(2000.0);
            assert_eq!(viz.positions()[1], 5.0);

            viz.set_parameters(patch(&[("playing", JsValue::TRUE)]), 3000.0)
                .expect("partial parameters");
            assert!(viz.is_playing());
        }
    }
}
