//! Static mesh and mode data, validated once at load.
//!
//! Input arrays may be flat (`[x0, y0, z0, x1, ...]`) or nested
//! (`[[x0, y0, z0], ...]`); both layouts occur in exported datasets.

use crate::error::DataShapeError;
use anyhow::{Context, Result};
use nalgebra::Point3;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Fraction of the reference curve's peak used to normalize displacement
/// into the colormap index domain.
pub const COLORMAX_FRACTION: f64 = 0.6;

/// A numeric array in either flat or row-nested layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericArray {
    Nested(Vec<Vec<f64>>),
    Flat(Vec<f64>),
}

impl NumericArray {
    /// Splits the array into fixed-width rows.
    pub fn rows<const W: usize>(&self, array: &str) -> Result<Vec<[f64; W]>, DataShapeError> {
        let rows = match self {
            NumericArray::Flat(values) => {
                if values.len() % W != 0 {
                    return Err(DataShapeError::RaggedFlatArray {
                        array: array.to_string(),
                        len: values.len(),
                        width: W,
                    });
                }
                values
                    .chunks_exact(W)
                    .map(|chunk| {
                        let mut row = [0.0; W];
                        row.copy_from_slice(chunk);
                        row
                    })
                    .collect::<Vec<_>>()
            }
            NumericArray::Nested(nested) => {
                let mut rows = Vec::with_capacity(nested.len());
                for (i, values) in nested.iter().enumerate() {
                    if values.len() != W {
                        return Err(DataShapeError::RowWidth {
                            array: array.to_string(),
                            row: i,
                            expected: W,
                            found: values.len(),
                        });
                    }
                    let mut row = [0.0; W];
                    row.copy_from_slice(values);
                    rows.push(row);
                }
                rows
            }
        };

        if let Some(row) = rows.iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(DataShapeError::NonFinite {
                array: array.to_string(),
                row,
            });
        }
        Ok(rows)
    }
}

/// Triangle indices in either flat or nested layout. Signed so that bad
/// input surfaces as an out-of-range index rather than a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexArray {
    Nested(Vec<Vec<i64>>),
    Flat(Vec<i64>),
}

impl IndexArray {
    fn triangles(&self, vertex_count: usize) -> Result<Vec<[u32; 3]>, DataShapeError> {
        let flat: Vec<i64> = match self {
            IndexArray::Flat(values) => {
                if values.len() % 3 != 0 {
                    return Err(DataShapeError::RaggedFlatArray {
                        array: "triangles".to_string(),
                        len: values.len(),
                        width: 3,
                    });
                }
                values.clone()
            }
            IndexArray::Nested(nested) => {
                let mut flat = Vec::with_capacity(nested.len() * 3);
                for (i, row) in nested.iter().enumerate() {
                    if row.len() != 3 {
                        return Err(DataShapeError::RowWidth {
                            array: "triangles".to_string(),
                            row: i,
                            expected: 3,
                            found: row.len(),
                        });
                    }
                    flat.extend_from_slice(row);
                }
                flat
            }
        };

        flat.chunks_exact(3)
            .enumerate()
            .map(|(triangle, chunk)| {
                let mut tri = [0u32; 3];
                for (slot, &index) in tri.iter_mut().zip(chunk) {
                    if index < 0 || index as usize >= vertex_count {
                        return Err(DataShapeError::TriangleIndexOutOfRange {
                            triangle,
                            index,
                            vertex_count,
                        });
                    }
                    *slot = index as u32;
                }
                Ok(tri)
            })
            .collect()
    }
}

/// Unvalidated dataset as it arrives from JSON or a JS host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    #[serde(alias = "base_vertices")]
    pub positions: NumericArray,
    #[serde(alias = "indices")]
    pub triangles: IndexArray,
    pub guided: NumericArray,
    pub propagating: NumericArray,
    pub evanescent: NumericArray,
    #[serde(alias = "x0s")]
    pub curve_x: Vec<f64>,
    #[serde(alias = "f0s")]
    pub curve_y: Vec<f64>,
}

/// One of the three field components of the decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeComponent {
    Guided,
    Propagating,
    Evanescent,
}

impl ModeComponent {
    /// Also the order in which enabled components are summed.
    pub const ALL: [ModeComponent; 3] = [
        ModeComponent::Guided,
        ModeComponent::Evanescent,
        ModeComponent::Propagating,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModeComponent::Guided => "guided",
            ModeComponent::Propagating => "propagating",
            ModeComponent::Evanescent => "evanescent",
        }
    }
}

/// Static guide line plotted alongside the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl ReferenceCurve {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, DataShapeError> {
        if x.len() != y.len() {
            return Err(DataShapeError::CurveLengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.is_empty() {
            return Err(DataShapeError::EmptyReferenceCurve);
        }
        for (array, values) in [("curve_x", &x), ("curve_y", &y)] {
            if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                return Err(DataShapeError::NonFinite {
                    array: array.to_string(),
                    row,
                });
            }
        }
        Ok(Self { x, y })
    }

    /// Number of samples; at least one.
    pub fn sample_count(&self) -> usize {
        self.x.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// `0.6 * max(y)`: the displacement that maps to either end of the colormap.
    pub fn colormax(&self) -> f64 {
        let peak = self.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        COLORMAX_FRACTION * peak
    }
}

/// Immutable per-vertex data for one dataset.
#[derive(Debug, Clone)]
pub struct DataStore {
    positions: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    guided: Vec<Complex<f64>>,
    propagating: Vec<Complex<f64>>,
    evanescent: Vec<Complex<f64>>,
    curve: ReferenceCurve,
}

impl DataStore {
    pub fn from_raw(raw: &RawDataset) -> Result<Self, DataShapeError> {
        let positions: Vec<Point3<f64>> = raw
            .positions
            .rows::<3>("positions")?
            .into_iter()
            .map(|[x, y, z]| Point3::new(x, y, z))
            .collect();
        let n = positions.len();

        let load_mode = |component: ModeComponent,
                         array: &NumericArray|
         -> Result<Vec<Complex<f64>>, DataShapeError> {
            let rows = array.rows::<2>(component.name())?;
            if rows.len() != n {
                return Err(DataShapeError::VertexCountMismatch {
                    array: component.name().to_string(),
                    expected: n,
                    found: rows.len(),
                });
            }
            Ok(rows
                .into_iter()
                .map(|[re, im]| Complex::new(re, im))
                .collect())
        };

        let guided = load_mode(ModeComponent::Guided, &raw.guided)?;
        let propagating = load_mode(ModeComponent::Propagating, &raw.propagating)?;
        let evanescent = load_mode(ModeComponent::Evanescent, &raw.evanescent)?;
        let triangles = raw.triangles.triangles(n)?;
        let curve = ReferenceCurve::new(raw.curve_x.clone(), raw.curve_y.clone())?;

        log::info!(
            "loaded dataset: {} vertices, {} triangles, {} curve samples",
            n,
            triangles.len(),
            curve.sample_count()
        );

        Ok(Self {
            positions,
            triangles,
            guided,
            propagating,
            evanescent,
            curve,
        })
    }

    /// Parses and validates a dataset serialized as one JSON object.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawDataset =
            serde_json::from_str(text).context("Failed to parse dataset JSON")?;
        let store = Self::from_raw(&raw).context("Dataset failed shape validation")?;
        Ok(store)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Triangle indices flattened for an index buffer.
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    pub fn coefficients(&self, component: ModeComponent) -> &[Complex<f64>] {
        match component {
            ModeComponent::Guided => &self.guided,
            ModeComponent::Propagating => &self.propagating,
            ModeComponent::Evanescent => &self.evanescent,
        }
    }

    pub fn curve(&self) -> &ReferenceCurve {
        &self.curve
    }
}
