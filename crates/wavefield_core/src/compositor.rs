//! Per-frame field composition and color mapping.
//!
//! For every vertex the enabled mode coefficients are summed into one complex
//! amplitude, rotated by the phase `speed * t`, and the real part becomes the
//! displacement. The displacement is normalized by `colormax` into a colormap
//! index.

use crate::colormap::{ColormapSet, ColormapTable, COLORMAP_SIZE};
use crate::data::{DataStore, ModeComponent, ReferenceCurve};
use crate::params::Parameters;
use nalgebra::Point3;
use num_complex::Complex;
use num_traits::clamp;

/// Sum of the enabled components' coefficients at one vertex.
/// Zero when every component is switched off.
pub fn enabled_sum(store: &DataStore, vertex: usize, params: &Parameters) -> Complex<f64> {
    let mut sum = Complex::new(0.0, 0.0);
    for component in ModeComponent::ALL {
        if params.is_enabled(component) {
            sum += store.coefficients(component)[vertex];
        }
    }
    sum
}

/// `cos(phase) * re + sin(phase) * im`.
pub fn rotate(sum: Complex<f64>, phase: f64) -> f64 {
    phase.cos() * sum.re + phase.sin() * sum.im
}

/// Maps a displacement onto `[0, 255]`.
///
/// `floor(256 * (y + colormax) / (2 * colormax))`, clamped. A degenerate
/// `colormax` can make the quotient infinite or NaN; infinities clamp to the
/// nearest end and NaN maps to 0.
pub fn color_index(y_field: f64, colormax: f64) -> usize {
    let size = COLORMAP_SIZE as f64;
    let raw = (size * (y_field + colormax) / (2.0 * colormax)).floor();
    // NaN survives clamp and then saturates to 0 in the cast.
    clamp(raw, 0.0, size - 1.0) as usize
}

/// Result of composing a single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSample {
    pub position: Point3<f64>,
    pub y_field: f64,
    pub color_index: usize,
    pub color: [f32; 3],
}

pub fn compose_vertex(
    store: &DataStore,
    table: &ColormapTable,
    params: &Parameters,
    vertex: usize,
    t: f64,
) -> VertexSample {
    let base = store.positions()[vertex];
    let y_field = rotate(enabled_sum(store, vertex, params), params.phase(t));
    let color_index = color_index(y_field, params.colormax);
    VertexSample {
        position: Point3::new(base.x, params.scale * y_field, base.z),
        y_field,
        color_index,
        color: table.color(color_index),
    }
}

/// Vertex buffers handed to the renderer, reused between frames.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffers {
    /// `3N` displaced positions.
    pub positions: Vec<f32>,
    /// `3N` RGB colors.
    pub colors: Vec<f32>,
    /// `N` unscaled displacements.
    pub fields: Vec<f64>,
}

impl FrameBuffers {
    fn resize(&mut self, vertex_count: usize) {
        self.positions.resize(vertex_count * 3, 0.0);
        self.colors.resize(vertex_count * 3, 0.0);
        self.fields.resize(vertex_count, 0.0);
    }
}

/// Recomputes every vertex for phase time `t`.
pub fn compose_frame(
    store: &DataStore,
    colormaps: &ColormapSet,
    params: &Parameters,
    t: f64,
    out: &mut FrameBuffers,
) {
    let n = store.vertex_count();
    out.resize(n);
    let table = colormaps.table(params.colormap);

    for i in 0..n {
        let sample = compose_vertex(store, table, params, i, t);
        let p = &mut out.positions[3 * i..3 * i + 3];
        p[0] = sample.position.x as f32;
        p[1] = sample.position.y as f32;
        p[2] = sample.position.z as f32;
        out.colors[3 * i..3 * i + 3].copy_from_slice(&sample.color);
        out.fields[i] = sample.y_field;
    }
}

/// Points of the reference curve for time `t`: sample `k` is drawn at
/// `(x_k, scale * y_k * cos(speed * t), z_offset)`.
pub fn animate_reference_curve(
    curve: &ReferenceCurve,
    params: &Parameters,
    t: f64,
    z_offset: f64,
    out: &mut Vec<f32>,
) {
    let amplitude = params.scale * params.phase(t).cos();
    out.clear();
    out.reserve(curve.sample_count() * 3);
    for (&x, &y) in curve.x().iter().zip(curve.y()) {
        out.extend([x as f32, (amplitude * y) as f32, z_offset as f32]);
    }
}
