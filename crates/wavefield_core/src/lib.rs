/// The `wavefield_core` crate animates a precomputed wave-mode decomposition
/// over a triangulated surface. It is renderer-agnostic: each frame it writes
/// displaced vertex positions and colors into flat buffers that a host
/// (the `wavefield_wasm` bridge, or a native renderer) uploads.
///
/// Key components:
/// - **Data**: `DataStore` with vertex positions, triangles, the reference curve and
///   the guided/propagating/evanescent mode coefficients, validated at load.
/// - **Colormaps**: the seven 256-entry lookup tables.
/// - **Compositor**: per-vertex phase rotation of the enabled modes and color mapping.
/// - **Clock** and **Ticker**: pausable animation time and the frame-scheduling seam.
/// - **Params**: live parameters shared between input handlers and the frame loop.
pub mod clock;
pub mod colormap;
pub mod compositor;
pub mod data;
pub mod error;
pub mod geometry;
pub mod params;
pub mod ticker;
pub mod traits;
pub mod view;
pub mod visualization;

pub use error::DataShapeError;
pub use visualization::Visualization;
