/// Local transform of a scene node
use crate::math::{self, Mat4, Vec3};

/// Five independently settable component matrices and the model matrix
/// derived from them.
///
/// The model matrix is always `T · Rx · Ry · Rz · S`, accumulated against
/// identity starting with scale, so a local point is scaled, rotated about
/// z, y, x and finally translated into the parent's space.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translation: Mat4,
    scale: Mat4,
    rotation_x: Mat4,
    rotation_y: Mat4,
    rotation_z: Mat4,
    position: Vec3,
    model: Mat4,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            translation: math::identity(),
            scale: math::identity(),
            rotation_x: math::identity(),
            rotation_y: math::identity(),
            rotation_z: math::identity(),
            position: Vec3::zeros(),
            model: math::identity(),
        }
    }

    /// Place the node in its parent's space. NaN is accepted as-is.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.translation = math::translation(x, y, z);
        self.recompute();
    }

    /// Offset the current position.
    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        let p = self.position;
        self.set_position(p.x + dx, p.y + dy, p.z + dz);
    }

    /// Replace the x rotation. Angles are absolute, not accumulated.
    pub fn rotate_x(&mut self, theta: f32) {
        self.rotation_x = math::rotate_x(theta);
        self.recompute();
    }

    pub fn rotate_y(&mut self, theta: f32) {
        self.rotation_y = math::rotate_y(theta);
        self.recompute();
    }

    pub fn rotate_z(&mut self, theta: f32) {
        self.rotation_z = math::rotate_z(theta);
        self.recompute();
    }

    pub fn set_scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.scale = math::scale(sx, sy, sz);
        self.recompute();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Composite local matrix (local space to parent space)
    pub fn model(&self) -> &Mat4 {
        &self.model
    }

    fn recompute(&mut self) {
        let mut model = math::identity();
        model = math::multiply(&self.scale, &model);
        model = math::multiply(&self.rotation_z, &model);
        model = math::multiply(&self.rotation_y, &model);
        model = math::multiply(&self.rotation_x, &model);
        model = math::multiply(&self.translation, &model);
        self.model = model;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
