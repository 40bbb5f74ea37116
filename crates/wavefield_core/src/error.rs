//! Load-time validation errors.

use thiserror::Error;

/// Raised when static input data does not have the shape the visualization
/// requires. Any of these aborts startup; nothing is rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataShapeError {
    /// A flat array's length is not a multiple of its row width.
    #[error("{array}: flat length {len} is not a multiple of row width {width}")]
    RaggedFlatArray {
        array: String,
        len: usize,
        width: usize,
    },

    /// A nested row has the wrong number of components.
    #[error("{array}: row {row} has {found} components, expected {expected}")]
    RowWidth {
        array: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A per-vertex array disagrees with the vertex count.
    #[error("{array}: {found} entries, expected one per vertex ({expected})")]
    VertexCountMismatch {
        array: String,
        expected: usize,
        found: usize,
    },

    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but only {vertex_count} vertices exist")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("reference curve has {x_len} x samples but {y_len} y samples")]
    CurveLengthMismatch { x_len: usize, y_len: usize },

    #[error("reference curve has no samples")]
    EmptyReferenceCurve,

    /// A colormap table does not hold exactly 256 entries.
    #[error("colormap {name}: {found} entries, expected 256")]
    ColormapLength { name: String, found: usize },

    #[error("colormap {0} is missing")]
    MissingColormap(String),

    #[error("{array}: non-finite value at row {row}")]
    NonFinite { array: String, row: usize },
}
