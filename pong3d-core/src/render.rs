/// Renderer boundary: the calls the scene makes to whatever owns the GPU
use crate::geometry::GeometryHandle;
use crate::math::{Mat4, Vec3};
use crate::texture::TextureHandle;

/// Opaque shader program handle, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Shader programs the scene draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneShaders {
    /// Lit, textured geometry
    pub world: ShaderHandle,
    /// Unlit geometry drawn at full brightness (the light itself)
    pub emissive: ShaderHandle,
}

impl Default for SceneShaders {
    fn default() -> Self {
        Self {
            world: ShaderHandle(0),
            emissive: ShaderHandle(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse = 0,
    Specular = 1,
}

/// How a geometry's draw count is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Non-indexed triangle list
    Arrays,
    /// Triangle list through a 16-bit index buffer
    Indexed,
}

/// Per-frame values shared by every draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
    pub light_position: Vec3,
    pub light_color: Vec3,
}

pub trait Renderer {
    fn begin_frame(&mut self, uniforms: &FrameUniforms);

    fn set_model_matrix(&mut self, shader: ShaderHandle, model: &Mat4);

    fn bind_texture(&mut self, slot: TextureSlot, texture: Option<TextureHandle>);

    fn draw_arrays(&mut self, geometry: GeometryHandle, count: u32);

    fn draw_indexed(&mut self, geometry: GeometryHandle, count: u32);
}

/// One draw call as seen by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub shader: ShaderHandle,
    pub geometry: GeometryHandle,
    pub count: u32,
    pub topology: Topology,
    pub diffuse: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
    pub model: Mat4,
}

/// Renderer that stores the calls it receives instead of issuing them.
///
/// Holds the last bound shader, model and textures the way a GL context
/// would, so each recorded command reflects the state at draw time.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub uniforms: Option<FrameUniforms>,
    pub commands: Vec<DrawCommand>,
    shader: Option<ShaderHandle>,
    model: Option<Mat4>,
    diffuse: Option<TextureHandle>,
    specular: Option<TextureHandle>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop recorded commands and bound state, ready for the next frame.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn record(&mut self, geometry: GeometryHandle, count: u32, topology: Topology) {
        let (Some(shader), Some(model)) = (self.shader, self.model) else {
            log::warn!("draw of {geometry:?} issued before a model matrix was set, skipped");
            return;
        };
        self.commands.push(DrawCommand {
            shader,
            geometry,
            count,
            topology,
            diffuse: self.diffuse,
            specular: self.specular,
            model,
        });
    }
}

impl Renderer for RecordingRenderer {
    fn begin_frame(&mut self, uniforms: &FrameUniforms) {
        self.uniforms = Some(uniforms.clone());
    }

    fn set_model_matrix(&mut self, shader: ShaderHandle, model: &Mat4) {
        self.shader = Some(shader);
        self.model = Some(*model);
    }

    fn bind_texture(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        match slot {
            TextureSlot::Diffuse => self.diffuse = texture,
            TextureSlot::Specular => self.specular = texture,
        }
    }

    fn draw_arrays(&mut self, geometry: GeometryHandle, count: u32) {
        self.record(geometry, count, Topology::Arrays);
    }

    fn draw_indexed(&mut self, geometry: GeometryHandle, count: u32) {
        self.record(geometry, count, Topology::Indexed);
    }
}
