/// Camera and projection utilities
use crate::config::CameraConfig;
use crate::error::MathError;
use crate::math::{self, Mat4, Vec3};
use nalgebra::Vector4;

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_config(&CameraConfig::default(), width as f32 / height.max(1) as f32)
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: config.fov,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Result<Mat4, MathError> {
        math::look_at(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Result<Mat4, MathError> {
        math::perspective(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project a local-space point to screen space.
///
/// `clip_from_local` is the full `projection · view · model` product.
/// Returns `(x, y, depth)` with depth in NDC, or `None` when the point is
/// behind the camera or outside the view volume.
pub fn project_to_screen(
    clip_from_local: &Mat4,
    point: &Vec3,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = clip_from_local * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    // Clip test
    if !(-1.0..=1.0).contains(&depth) {
        return None;
    }
    if ndc_x.abs() > 4.0 || ndc_y.abs() > 4.0 {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}
