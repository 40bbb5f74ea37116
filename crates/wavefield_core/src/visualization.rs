//! One running visualization: static data, live parameters, clock and the
//! per-frame output buffers.

use crate::clock::AnimationClock;
use crate::colormap::ColormapSet;
use crate::compositor::{animate_reference_curve, compose_frame, FrameBuffers};
use crate::data::DataStore;
use crate::geometry;
use crate::params::{ParameterPatch, ParameterUpdate, Parameters, SharedParameters};
use crate::view::{Projection, SceneLayout};
use anyhow::Result;

pub struct Visualization {
    store: DataStore,
    colormaps: ColormapSet,
    params: SharedParameters,
    clock: AnimationClock,
    layout: SceneLayout,
    projection: Projection,
    normals: Vec<f32>,
    indices: Vec<u32>,
    buffers: FrameBuffers,
    curve_points: Vec<f32>,
}

impl Visualization {
    /// Starts the clock at `now` and composes the first frame.
    pub fn new(store: DataStore, colormaps: ColormapSet, layout: SceneLayout, now: f64) -> Self {
        let colormax = store.curve().colormax();
        if colormax.is_nan() || colormax <= 0.0 {
            log::warn!(
                "reference curve gives non-positive colormax {colormax}; colors will saturate"
            );
        }

        let normals = geometry::flatten(&geometry::vertex_normals(
            store.positions(),
            store.triangles(),
        ));
        let indices = store.flat_indices();
        let projection = Projection::new(&layout, 1, 1);

        let mut viz = Self {
            store,
            colormaps,
            params: SharedParameters::new(Parameters::with_colormax(colormax)),
            clock: AnimationClock::start(now),
            layout,
            projection,
            normals,
            indices,
            buffers: FrameBuffers::default(),
            curve_points: Vec::new(),
        };
        viz.render(0.0);
        viz
    }

    pub fn from_json(dataset_json: &str, colormaps_json: &str, now: f64) -> Result<Self> {
        let store = DataStore::from_json(dataset_json)?;
        let colormaps = ColormapSet::from_json(colormaps_json)?;
        Ok(Self::new(store, colormaps, SceneLayout::default(), now))
    }

    /// Handle for input callbacks living outside the frame loop.
    pub fn parameters(&self) -> &SharedParameters {
        &self.params
    }

    /// Applies one panel event. Play/pause also drives the clock. Returns
    /// whether the clock is running afterwards, for the host's ticker.
    pub fn apply(&mut self, update: ParameterUpdate, now: f64) -> bool {
        let params = self.params.apply(update);
        if let ParameterUpdate::Playing(_) = update {
            self.clock.set_running(params.playing, now);
        }
        self.clock.is_running()
    }

    /// Overwrites the parameters present in `patch`. The clock is only
    /// touched when the patch carries `playing`.
    pub fn set_parameters(&mut self, patch: &ParameterPatch, now: f64) -> bool {
        let params = self.params.merge(patch);
        if patch.playing.is_some() {
            self.clock.set_running(params.playing, now);
        }
        self.clock.is_running()
    }

    /// Advances the clock to `now` and recomposes the frame.
    pub fn frame(&mut self, now: f64) -> &FrameBuffers {
        let t = self.clock.tick(now);
        self.render(t);
        &self.buffers
    }

    fn render(&mut self, t: f64) {
        let params = self.params.snapshot();
        compose_frame(&self.store, &self.colormaps, &params, t, &mut self.buffers);
        animate_reference_curve(
            self.store.curve(),
            &params,
            t,
            self.layout.z_offset,
            &mut self.curve_points,
        );
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.projection.resize(width, height)
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn curve_points(&self) -> &[f32] {
        &self.curve_points
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}
