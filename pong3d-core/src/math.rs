/// Matrix and vector functions used to build model, view and projection matrices.
///
/// Every function is pure: operands are borrowed, results are fresh values.
/// Matrices are written out row by row (`Matrix4::new` takes its arguments in
/// row-major order), and [`to_row_major`] produces the layout handed to the
/// renderer boundary.
use nalgebra::{Matrix4, Vector3, Vector4};

use crate::error::MathError;

pub type Mat4 = Matrix4<f32>;
pub type Vec3 = Vector3<f32>;

/// Smallest `|up × forward|` relative to `|up|` accepted by [`look_at`].
const PARALLEL_EPSILON: f32 = 1e-6;

pub fn identity() -> Mat4 {
    Mat4::identity()
}

#[rustfmt::skip]
pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
    Mat4::new(
        1.0, 0.0, 0.0, tx,
        0.0, 1.0, 0.0, ty,
        0.0, 0.0, 1.0, tz,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
    Mat4::new(
        sx, 0.0, 0.0, 0.0,
        0.0, sy, 0.0, 0.0,
        0.0, 0.0, sz, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed rotation about the x axis (radians)
#[rustfmt::skip]
pub fn rotate_x(theta: f32) -> Mat4 {
    let (s, c) = theta.sin_cos();
    Mat4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c, -s, 0.0,
        0.0, s, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed rotation about the y axis (radians)
#[rustfmt::skip]
pub fn rotate_y(theta: f32) -> Mat4 {
    let (s, c) = theta.sin_cos();
    Mat4::new(
        c, 0.0, s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Right-handed rotation about the z axis (radians)
#[rustfmt::skip]
pub fn rotate_z(theta: f32) -> Mat4 {
    let (s, c) = theta.sin_cos();
    Mat4::new(
        c, -s, 0.0, 0.0,
        s, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// `a · b`: `b` is applied to a point first, then `a`.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    a * b
}

pub fn transpose(m: &Mat4) -> Mat4 {
    m.transpose()
}

/// OpenGL-style perspective projection (right-handed, clip z in [-w, w]).
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Mat4, MathError> {
    if far == near {
        return Err(MathError::InvalidArgument {
            name: "far",
            reason: "far plane coincides with the near plane",
        });
    }
    if aspect == 0.0 {
        return Err(MathError::InvalidArgument {
            name: "aspect",
            reason: "aspect ratio is zero",
        });
    }
    let tan_half = (fov_y / 2.0).tan();
    if tan_half == 0.0 {
        return Err(MathError::InvalidArgument {
            name: "fov_y",
            reason: "field of view has a zero half-angle tangent",
        });
    }

    let a11 = 1.0 / (aspect * tan_half);
    let a22 = 1.0 / tan_half;
    let a33 = -(far + near) / (far - near);
    let a34 = -(2.0 * far * near) / (far - near);
    #[rustfmt::skip]
    let projection = Mat4::new(
        a11, 0.0, 0.0, 0.0,
        0.0, a22, 0.0, 0.0,
        0.0, 0.0, a33, a34,
        0.0, 0.0, -1.0, 0.0,
    );
    Ok(projection)
}

/// View matrix for a camera at `eye` looking at `target`.
///
/// Fails with [`MathError::ZeroLengthVector`] when `eye == target` and with
/// [`MathError::ParallelUpVector`] when `up` is (anti)parallel to the viewing
/// axis or zero.
pub fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Result<Mat4, MathError> {
    let forward = normalize(&subtract(eye, target))?;
    let side = cross(up, &forward);
    if length(&side) <= PARALLEL_EPSILON * length(up) {
        return Err(MathError::ParallelUpVector);
    }
    let right = normalize(&side)?;
    let camera_up = cross(&forward, &right);

    #[rustfmt::skip]
    let basis = Mat4::new(
        right.x, right.y, right.z, 0.0,
        camera_up.x, camera_up.y, camera_up.z, 0.0,
        forward.x, forward.y, forward.z, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    Ok(multiply(&basis, &translation(-eye.x, -eye.y, -eye.z)))
}

pub fn normalize(v: &Vec3) -> Result<Vec3, MathError> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(MathError::InvalidArgument {
            name: "v",
            reason: "vector has non-finite components",
        });
    }
    // Scale into [-1, 1] first so squaring large components cannot overflow.
    let largest = v.amax();
    if largest == 0.0 {
        return Err(MathError::ZeroLengthVector);
    }
    let scaled = v / largest;
    let len = length(&scaled);
    Ok(Vec3::new(scaled.x / len, scaled.y / len, scaled.z / len))
}

pub fn dot(a: &Vec3, b: &Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

pub fn subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

pub fn length(v: &Vec3) -> f32 {
    dot(v, v).sqrt()
}

/// Transform a point (w = 1). No perspective divide.
pub fn transform_point(m: &Mat4, p: &Vec3) -> Vec3 {
    (m * Vector4::new(p.x, p.y, p.z, 1.0)).xyz()
}

/// Transform a direction (w = 0), ignoring translation.
pub fn transform_direction(m: &Mat4, d: &Vec3) -> Vec3 {
    (m * Vector4::new(d.x, d.y, d.z, 0.0)).xyz()
}

/// Flatten to 16 numbers, row by row.
pub fn to_row_major(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = m[(row, col)];
        }
    }
    out
}

pub fn from_row_major(values: &[f32; 16]) -> Mat4 {
    Mat4::from_row_slice(values)
}
