/// Pong3D Core Library - scene graph, math and choreography
///
/// Everything here is platform independent: front ends supply a
/// [`GeometryProvider`], a [`TextureProvider`], a [`Renderer`] and an
/// [`AudioSink`], then call [`Demo::update`] and [`Demo::render`] once per
/// frame.

pub mod audio;
pub mod config;
pub mod demo;
pub mod error;
pub mod geometry;
pub mod math;
pub mod node;
pub mod phase;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;

// Re-export commonly used types
pub use audio::{AudioCue, AudioSink, Silent};
pub use config::{CameraConfig, DemoConfig, Timeline};
pub use demo::{Demo, Frame};
pub use error::{ConstructionError, MathError, SceneError};
pub use geometry::{
    GeometryHandle, GeometryKind, GeometryProvider, Mesh, MeshLibrary, Triangle, Vertex,
};
pub use math::{Mat4, Vec3};
pub use node::{Geometry, Material, Node, NodeKind};
pub use phase::{Director, Phase};
pub use projection::Camera;
pub use render::{
    DrawCommand, FrameUniforms, RecordingRenderer, Renderer, SceneShaders, ShaderHandle,
    TextureSlot, Topology,
};
pub use scene::Scene;
pub use texture::{
    SamplerMode, TextureHandle, TextureImage, TextureProvider, TextureRegistry, TextureState,
    PLACEHOLDER_RGBA,
};
pub use transform::Transform;
