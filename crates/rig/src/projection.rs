use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Perspective projection parameters of the viewer camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Recompute the aspect ratio for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        tracing::debug!(width, height, aspect = self.aspect, "viewport resized");
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, view: Mat4) -> Mat4 {
        self.projection_matrix() * view
    }
}
