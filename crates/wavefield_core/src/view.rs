//! Scene constants and camera projection.
//!
//! The renderer owns cameras and transforms; this module only supplies the
//! numbers it needs and recomputes the projection on resize.

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLayout {
    /// Translation along z shared by the mesh and the reference curve.
    pub z_offset: f64,
    pub camera_position: [f64; 3],
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            z_offset: -4.0,
            camera_position: [0.0, 8.0, -6.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl SceneLayout {
    /// Initial view matrix: camera at `camera_position` looking at the origin.
    pub fn view_matrix(&self) -> Matrix4<f64> {
        let [x, y, z] = self.camera_position;
        Isometry3::look_at_rh(&Point3::new(x, y, z), &Point3::origin(), &Vector3::y())
            .to_homogeneous()
    }

    /// Model matrix for the mesh.
    pub fn mesh_transform(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(0.0, 0.0, self.z_offset))
    }
}

/// Perspective projection tracking the viewport size.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    fov_degrees: f64,
    near: f64,
    far: f64,
    width: u32,
    height: u32,
}

impl Projection {
    pub fn new(layout: &SceneLayout, width: u32, height: u32) -> Self {
        Self {
            fov_degrees: layout.fov_degrees,
            near: layout.near,
            far: layout.far,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Zero-sized viewports (minimized windows) keep the last aspect.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn matrix(&self) -> Matrix4<f64> {
        Perspective3::new(
            self.aspect(),
            self.fov_degrees.to_radians(),
            self.near,
            self.far,
        )
        .into_inner()
    }

    /// Column-major, as WebGL uniform uploads expect.
    pub fn column_major(&self) -> Vec<f32> {
        self.matrix().iter().map(|&v| v as f32).collect()
    }
}
