/// Demo tunables and their defaults
use crate::math::Vec3;

/// How long each phase runs, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    pub cluster_seconds: f32,
    pub rally_seconds: f32,
    pub breakout_seconds: f32,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            cluster_seconds: 8.0,
            rally_seconds: 20.0,
            breakout_seconds: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Radius of the circle the eye sweeps along
    pub orbit_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 0.78,
            near: 0.1,
            far: 100.0,
            orbit_radius: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub timeline: Timeline,
    pub camera: CameraConfig,
    pub light_color: Vec3,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            timeline: Timeline::default(),
            camera: CameraConfig::default(),
            light_color: Vec3::new(0.95, 0.75, 0.95),
        }
    }
}
