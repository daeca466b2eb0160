/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector3;
use pong3d_core::math::{self, Mat4};
use pong3d_core::projection::project_to_screen;
use pong3d_core::{
    FrameUniforms, GeometryHandle, MeshLibrary, Renderer, ShaderHandle, TextureHandle,
    TextureRegistry, TextureSlot, Triangle,
};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light that still reaches faces turned away from the lamp
const AMBIENT: f32 = 0.15;

/// Untextured faces render grey
const UNTEXTURED_RGB: [u8; 3] = [200, 200, 200];

/// ASCII canvas with a depth buffer and a per-cell colour
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Number of cells something was drawn into
    pub fn covered(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// One frame's [`Renderer`] over an [`AsciiRenderer`].
///
/// Geometry handles resolve through the mesh library and texture handles
/// through the registry, so a texture that finishes loading between frames
/// changes colour on the next one.
pub struct FrameTarget<'a> {
    canvas: &'a mut AsciiRenderer,
    meshes: &'a MeshLibrary,
    textures: &'a TextureRegistry,
    emissive: ShaderHandle,
    clip_from_world: Mat4,
    light_position: Vector3<f32>,
    light_color: Vector3<f32>,
    shader: Option<ShaderHandle>,
    model: Option<Mat4>,
    diffuse: Option<TextureHandle>,
}

impl<'a> FrameTarget<'a> {
    pub fn new(
        canvas: &'a mut AsciiRenderer,
        meshes: &'a MeshLibrary,
        textures: &'a TextureRegistry,
        emissive: ShaderHandle,
    ) -> Self {
        Self {
            canvas,
            meshes,
            textures,
            emissive,
            clip_from_world: math::identity(),
            light_position: Vector3::zeros(),
            light_color: Vector3::new(1.0, 1.0, 1.0),
            shader: None,
            model: None,
            diffuse: None,
        }
    }

    fn draw_geometry(&mut self, geometry: GeometryHandle, count: u32) {
        let Some(model) = self.model else {
            log::warn!("draw of {geometry:?} issued before a model matrix was set, skipped");
            return;
        };
        let meshes = self.meshes;
        let Some(mesh) = meshes.mesh(geometry) else {
            log::warn!("draw of unknown {geometry:?} skipped");
            return;
        };
        let emissive = self.shader == Some(self.emissive);
        let tint = self.tint();
        for triangle in mesh.triangles(count) {
            self.render_triangle(&triangle, &model, emissive, tint);
        }
    }

    fn tint(&self) -> [u8; 3] {
        match self.diffuse {
            Some(texture) => {
                let [r, g, b, _] = self.textures.color(texture);
                [r, g, b]
            }
            None => UNTEXTURED_RGB,
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model: &Mat4,
        emissive: bool,
        tint: [u8; 3],
    ) {
        let world = triangle
            .vertices
            .map(|vertex| math::transform_point(model, &vertex.position));

        let mut screen = [(0.0, 0.0, 0.0); 3];
        for (slot, point) in screen.iter_mut().zip(world.iter()) {
            let Some(projected) = project_to_screen(
                &self.clip_from_world,
                point,
                self.canvas.width as u32,
                self.canvas.height as u32,
            ) else {
                return; // Triangle is clipped
            };
            *slot = projected;
        }

        let brightness = if emissive {
            1.0
        } else {
            self.lambert(&world).unwrap_or(AMBIENT)
        };

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        let shade = |channel: u8, light: f32| {
            (channel as f32 * light * (0.3 + 0.7 * brightness)).min(255.0) as u8
        };
        let color = Color::Rgb {
            r: shade(tint[0], self.light_color.x),
            g: shade(tint[1], self.light_color.y),
            b: shade(tint[2], self.light_color.z),
        };

        self.canvas.rasterize_triangle(&screen, character, color);
    }

    /// Diffuse term toward the frame's light, `None` for a degenerate face
    fn lambert(&self, world: &[Vector3<f32>; 3]) -> Option<f32> {
        let face = math::cross(&(world[1] - world[0]), &(world[2] - world[0]));
        let normal = math::normalize(&face).ok()?;
        let centre = (world[0] + world[1] + world[2]) / 3.0;
        let to_light = math::normalize(&(self.light_position - centre)).ok()?;
        Some(AMBIENT + (1.0 - AMBIENT) * math::dot(&normal, &to_light).max(0.0))
    }
}

impl Renderer for FrameTarget<'_> {
    fn begin_frame(&mut self, uniforms: &FrameUniforms) {
        self.canvas.clear();
        self.clip_from_world = math::multiply(&uniforms.projection, &uniforms.view);
        self.light_position = uniforms.light_position;
        self.light_color = uniforms.light_color;
    }

    fn set_model_matrix(&mut self, shader: ShaderHandle, model: &Mat4) {
        self.shader = Some(shader);
        self.model = Some(*model);
    }

    fn bind_texture(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        // Specular maps have no effect on character shading
        if slot == TextureSlot::Diffuse {
            self.diffuse = texture;
        }
    }

    fn draw_arrays(&mut self, geometry: GeometryHandle, count: u32) {
        self.draw_geometry(geometry, count);
    }

    fn draw_indexed(&mut self, geometry: GeometryHandle, count: u32) {
        self.draw_geometry(geometry, count);
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
