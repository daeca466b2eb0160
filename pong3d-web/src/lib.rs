/// Pong3D Web - WASM facade over the demo for a WebGL host page
///
/// The page owns the GL context. Each animation frame it calls
/// [`WebDemo::frame`], uploads the frame uniforms and walks
/// [`WebDemo::draw_list`]. Geometry buffers are fetched once by id, textures
/// are loaded by the page and reported back through `texture_loaded` /
/// `texture_failed`.
use pong3d_core::math::{self, Vec3};
use pong3d_core::{
    Demo, DemoConfig, DrawCommand, GeometryHandle, MeshLibrary, RecordingRenderer, SamplerMode,
    SceneError, SceneShaders, TextureHandle, TextureImage, TextureRegistry, TextureState, Topology,
};
use wasm_bindgen::prelude::*;

/// Floats per entry in [`WebDemo::draw_list`]
pub const DRAW_STRIDE: usize = 22;

/// Undrained cues kept for [`WebDemo::take_audio_cues`]; older ones are
/// dropped first.
pub const MAX_PENDING_CUES: usize = 128;

/// Append one draw as: shader, geometry, count, indexed flag, diffuse,
/// specular (-1 when unbound), then the 16 row-major model floats.
pub fn encode_draw(command: &DrawCommand, out: &mut Vec<f32>) {
    let texture = |handle: Option<TextureHandle>| handle.map_or(-1.0, |h| h.0 as f32);
    out.extend_from_slice(&[
        command.shader.0 as f32,
        command.geometry.0 as f32,
        command.count as f32,
        if command.topology == Topology::Indexed { 1.0 } else { 0.0 },
        texture(command.diffuse),
        texture(command.specular),
    ]);
    out.extend_from_slice(&math::to_row_major(&command.model));
}

fn vec3(v: &Vec3) -> Vec<f32> {
    vec![v.x, v.y, v.z]
}

#[wasm_bindgen]
pub struct WebDemo {
    demo: Demo,
    meshes: MeshLibrary,
    textures: TextureRegistry,
    requests: Vec<(u32, String)>,
    recorder: RecordingRenderer,
    draw_list: Vec<f32>,
    cues: Vec<u8>,
}

impl WebDemo {
    pub fn with_config(config: &DemoConfig, aspect: f32) -> Result<WebDemo, SceneError> {
        let mut meshes = MeshLibrary::new();
        let mut textures = TextureRegistry::new();
        let demo = Demo::new(config, &mut meshes, &mut textures, SceneShaders::default(), aspect)?;
        let mut web = WebDemo {
            demo,
            meshes,
            textures,
            requests: Vec::new(),
            recorder: RecordingRenderer::new(),
            draw_list: Vec::new(),
            cues: Vec::new(),
        };
        web.collect_requests();
        web.record();
        Ok(web)
    }

    fn collect_requests(&mut self) {
        let pending = self.textures.take_pending();
        self.requests.extend(
            pending
                .into_iter()
                .map(|(handle, path)| (handle.0, path.to_string_lossy().into_owned())),
        );
    }

    fn record(&mut self) {
        self.recorder.clear();
        self.demo.render(&mut self.recorder);
        self.draw_list.clear();
        for command in &self.recorder.commands {
            encode_draw(command, &mut self.draw_list);
        }
    }
}

#[wasm_bindgen]
impl WebDemo {
    #[wasm_bindgen(constructor)]
    pub fn new(aspect: f32) -> Result<WebDemo, JsValue> {
        Self::with_config(&DemoConfig::default(), aspect)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Advance to `time_ms` since start and record the frame. Returns false
    /// once the demo has finished; the page should stop requesting frames.
    pub fn frame(&mut self, time_ms: f64) -> bool {
        let frame = self.demo.update((time_ms / 1000.0) as f32);
        self.cues.extend(frame.cues.iter().map(|cue| cue.id()));
        if self.cues.len() > MAX_PENDING_CUES {
            let excess = self.cues.len() - MAX_PENDING_CUES;
            self.cues.drain(..excess);
        }
        self.collect_requests();
        self.record();
        !self.demo.is_finished()
    }

    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), JsValue> {
        self.demo
            .set_aspect(aspect)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn draw_list(&self) -> Vec<f32> {
        self.draw_list.clone()
    }

    pub fn draw_stride(&self) -> usize {
        DRAW_STRIDE
    }

    pub fn view(&self) -> Vec<f32> {
        math::to_row_major(&self.demo.uniforms().view).to_vec()
    }

    pub fn projection(&self) -> Vec<f32> {
        math::to_row_major(&self.demo.uniforms().projection).to_vec()
    }

    pub fn eye(&self) -> Vec<f32> {
        vec3(&self.demo.uniforms().eye)
    }

    pub fn light_position(&self) -> Vec<f32> {
        vec3(&self.demo.uniforms().light_position)
    }

    pub fn light_color(&self) -> Vec<f32> {
        vec3(&self.demo.uniforms().light_color)
    }

    pub fn geometry_count(&self) -> u32 {
        self.meshes.len() as u32
    }

    /// Interleaved position, normal, uv floats for a geometry id
    pub fn geometry_vertices(&self, id: u32) -> Vec<f32> {
        self.meshes
            .mesh(GeometryHandle(id))
            .map(|mesh| mesh.interleaved())
            .unwrap_or_default()
    }

    /// 16-bit indices, empty for non-indexed geometry
    pub fn geometry_indices(&self, id: u32) -> Vec<u16> {
        self.meshes
            .mesh(GeometryHandle(id))
            .and_then(|mesh| mesh.indices())
            .map(<[u16]>::to_vec)
            .unwrap_or_default()
    }

    pub fn texture_request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn texture_request_id(&self, index: usize) -> Option<u32> {
        self.requests.get(index).map(|(id, _)| *id)
    }

    pub fn texture_request_path(&self, index: usize) -> Option<String> {
        self.requests.get(index).map(|(_, path)| path.clone())
    }

    /// Call once every request has been handed to an image loader.
    pub fn clear_texture_requests(&mut self) {
        self.requests.clear();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn texture_loaded(&mut self, id: u32, width: u32, height: u32, r: u8, g: u8, b: u8, a: u8) {
        self.textures.complete(
            TextureHandle(id),
            TextureImage {
                width,
                height,
                mean_rgba: [r, g, b, a],
            },
        );
    }

    pub fn texture_failed(&mut self, id: u32, reason: &str) {
        self.textures.fail(TextureHandle(id), reason);
    }

    /// Whether the page should generate mipmaps for a loaded texture
    pub fn texture_mipmapped(&self, id: u32) -> bool {
        matches!(
            self.textures.state(TextureHandle(id)),
            Some(TextureState::Ready {
                sampler: SamplerMode::Mipmapped,
                ..
            })
        )
    }

    /// Cue ids fired since the last call (0 = table bounce, 1 = paddle strike)
    pub fn take_audio_cues(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.cues)
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) leaves the first logger in place.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("pong3d-web ready");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pong3d_core::{ShaderHandle, PLACEHOLDER_RGBA};

    fn web() -> WebDemo {
        WebDemo::with_config(&DemoConfig::default(), 1.5).unwrap()
    }

    #[test]
    fn test_encode_draw_layout() {
        let command = DrawCommand {
            shader: ShaderHandle(1),
            geometry: GeometryHandle(4),
            count: 1080,
            topology: Topology::Indexed,
            diffuse: Some(TextureHandle(2)),
            specular: None,
            model: math::translation(3.0, 0.0, 0.0),
        };
        let mut out = Vec::new();
        encode_draw(&command, &mut out);

        assert_eq!(out.len(), DRAW_STRIDE);
        assert_eq!(&out[..6], &[1.0, 4.0, 1080.0, 1.0, 2.0, -1.0]);
        // row-major: translation sits at the end of the first row
        assert_eq!(out[6 + 3], 3.0);
    }

    #[test]
    fn test_frames_until_finished() {
        let mut web = web();
        assert_eq!(web.draw_list().len() % DRAW_STRIDE, 0);
        assert!(web.frame(1_000.0));
        assert!(web.frame(12_000.0));
        assert!(!web.frame(40_000.0));
    }

    #[test]
    fn test_texture_requests_and_callbacks() {
        let mut web = web();
        assert_eq!(web.texture_request_count(), 7);
        let id = web.texture_request_id(0).unwrap();
        assert!(web.texture_request_path(0).unwrap().starts_with("imgs/"));
        assert_eq!(web.texture_request_id(7), None);

        web.clear_texture_requests();
        assert_eq!(web.texture_request_count(), 0);

        assert!(!web.texture_mipmapped(id));
        web.texture_loaded(id, 256, 256, 1, 2, 3, 255);
        assert!(web.texture_mipmapped(id));

        web.texture_failed(id + 1, "404");
        assert_eq!(web.textures.color(TextureHandle(id + 1)), PLACEHOLDER_RGBA);
    }

    #[test]
    fn test_geometry_export() {
        let web = web();
        assert_eq!(web.geometry_count(), 5);
        let cube = web.geometry_vertices(0);
        assert_eq!(cube.len(), 36 * 8);
        assert!(web.geometry_indices(0).is_empty());
        assert!(web.geometry_vertices(99).is_empty());
    }

    #[test]
    fn test_rally_produces_audio_cues() {
        let mut web = web();
        // step through the rally at 60 fps
        let mut time = 8_000.0;
        while time < 12_000.0 {
            web.frame(time);
            time += 1000.0 / 60.0;
        }
        let cues = web.take_audio_cues();
        assert!(cues.contains(&1));
        assert!(web.take_audio_cues().is_empty());
    }

    #[test]
    fn test_undrained_cues_are_capped() {
        let mut web = web();
        // A paddle turn-around one second into the rally
        let strike_ms = 8_000.0 + 1000.0 * f64::from(2.0 - std::f32::consts::FRAC_PI_2) / 2.0;
        for _ in 0..MAX_PENDING_CUES + 50 {
            web.frame(strike_ms);
        }
        let cues = web.take_audio_cues();
        assert_eq!(cues.len(), MAX_PENDING_CUES);
        assert!(cues.iter().all(|&id| id == 1));
    }
}
