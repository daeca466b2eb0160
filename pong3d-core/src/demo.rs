/// Per-frame driver tying the director, scene and camera together
use crate::audio::{AudioCue, AudioSink};
use crate::config::DemoConfig;
use crate::error::{MathError, SceneError};
use crate::geometry::GeometryProvider;
use crate::math::Mat4;
use crate::phase::{Director, Phase};
use crate::projection::Camera;
use crate::render::{FrameUniforms, Renderer, SceneShaders};
use crate::scene::Scene;
use crate::texture::TextureProvider;

/// Result of one [`Demo::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub phase: Phase,
    /// Seconds spent in `phase`
    pub phase_time: f32,
    pub cues: Vec<AudioCue>,
}

impl Frame {
    /// Forward this frame's cues to `sink`.
    pub fn play(&self, sink: &mut dyn AudioSink) {
        for cue in &self.cues {
            sink.play(*cue);
        }
    }
}

/// The whole demo: one `update` then one `render` per display frame.
#[derive(Debug, Clone)]
pub struct Demo {
    scene: Scene,
    director: Director,
    camera: Camera,
    shaders: SceneShaders,
    uniforms: FrameUniforms,
    phase: Phase,
}

impl Demo {
    pub fn new(
        config: &DemoConfig,
        geometry: &mut impl GeometryProvider,
        textures: &mut impl TextureProvider,
        shaders: SceneShaders,
        aspect: f32,
    ) -> Result<Self, SceneError> {
        let scene = Scene::build(geometry, textures, config)?;
        let camera = Camera::from_config(&config.camera, aspect);
        let uniforms = FrameUniforms {
            view: camera.view_matrix()?,
            projection: camera.projection_matrix()?,
            eye: camera.position,
            light_position: scene.light_position(Phase::Cluster),
            light_color: config.light_color,
        };

        let mut demo = Self {
            scene,
            director: Director::new(config.timeline),
            camera,
            shaders,
            uniforms,
            phase: Phase::Cluster,
        };
        demo.update(0.0);
        Ok(demo)
    }

    /// Advance to `time` seconds since the demo started: step the phase,
    /// pose the scene and move the camera. Everything `render` reads is
    /// settled before this returns.
    pub fn update(&mut self, time: f32) -> Frame {
        let (phase, phase_time) = self.director.advance(time);
        self.phase = phase;
        let cues = self.scene.tick(phase, phase_time);

        let (eye, target) = self.scene.camera_pose(phase, phase_time);
        self.camera.position = eye;
        self.camera.target = target;
        match self.camera.view_matrix() {
            Ok(view) => {
                self.uniforms.view = view;
                self.uniforms.eye = eye;
            }
            Err(err) => log::warn!("keeping previous view, camera update skipped: {err}"),
        }
        self.uniforms.light_position = self.scene.light_position(phase);

        Frame {
            phase,
            phase_time,
            cues,
        }
    }

    /// Issue the current frame. Does not modify the scene.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.begin_frame(&self.uniforms);
        self.scene.draw(self.phase, renderer, &self.shaders);
    }

    /// Rebuild the projection for a new viewport. An invalid aspect keeps
    /// the old projection.
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), MathError> {
        let previous = self.camera.aspect;
        self.camera.aspect = aspect;
        match self.camera.projection_matrix() {
            Ok(projection) => {
                self.uniforms.projection = projection;
                Ok(())
            }
            Err(err) => {
                self.camera.aspect = previous;
                Err(err)
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.director.is_finished()
    }

    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    pub fn projection(&self) -> &Mat4 {
        &self.uniforms.projection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MeshLibrary;
    use crate::render::RecordingRenderer;
    use crate::texture::TextureRegistry;

    fn demo() -> Demo {
        let mut library = MeshLibrary::new();
        let mut textures = TextureRegistry::new();
        Demo::new(
            &DemoConfig::default(),
            &mut library,
            &mut textures,
            SceneShaders::default(),
            4.0 / 3.0,
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Collect(Vec<AudioCue>);

    impl AudioSink for Collect {
        fn play(&mut self, cue: AudioCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn test_render_sends_uniforms_first() {
        let demo = demo();
        let mut renderer = RecordingRenderer::new();
        demo.render(&mut renderer);
        assert_eq!(renderer.uniforms.as_ref(), Some(demo.uniforms()));
        assert_eq!(renderer.commands.len(), 19);
    }

    #[test]
    fn test_update_walks_phases() {
        let mut demo = demo();
        assert_eq!(demo.update(1.0).phase, Phase::Cluster);
        assert_eq!(demo.update(10.0).phase, Phase::Rally);
        assert_eq!(demo.update(29.0).phase, Phase::Breakout);
        assert!(!demo.is_finished());
        assert_eq!(demo.update(31.5).phase, Phase::Finished);
        assert!(demo.is_finished());
    }

    #[test]
    fn test_frame_forwards_cues() {
        let frame = Frame {
            phase: Phase::Rally,
            phase_time: 0.0,
            cues: vec![AudioCue::TableBounce, AudioCue::PaddleStrike],
        };
        let mut sink = Collect::default();
        frame.play(&mut sink);
        assert_eq!(sink.0, frame.cues);
    }

    #[test]
    fn test_degenerate_camera_keeps_previous_view() {
        // A zero orbit puts the rally eye straight above its target
        let mut config = DemoConfig::default();
        config.camera.orbit_radius = 0.0;
        let mut library = MeshLibrary::new();
        let mut textures = TextureRegistry::new();
        let mut demo = Demo::new(
            &config,
            &mut library,
            &mut textures,
            SceneShaders::default(),
            4.0 / 3.0,
        )
        .unwrap();

        assert_eq!(demo.update(1.0).phase, Phase::Cluster);
        let before = demo.uniforms().clone();
        assert_eq!(demo.update(10.0).phase, Phase::Rally);
        assert_eq!(demo.uniforms().view, before.view);
        assert_eq!(demo.uniforms().eye, before.eye);
        assert!(demo.uniforms().view.iter().all(|v| v.is_finite()));

        // The frame still renders with the kept view
        let mut renderer = RecordingRenderer::new();
        demo.render(&mut renderer);
        assert_eq!(renderer.uniforms.unwrap().view, before.view);
    }

    #[test]
    fn test_invalid_aspect_keeps_projection() {
        let mut demo = demo();
        let before = *demo.projection();
        assert!(demo.set_aspect(0.0).is_err());
        assert_eq!(*demo.projection(), before);
        assert!(demo.set_aspect(2.0).is_ok());
        assert_ne!(*demo.projection(), before);
    }
}
