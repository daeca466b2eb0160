/// Whole-demo behaviour observed through the recording renderer.
use pong3d_core::math;
use pong3d_core::{
    AudioCue, Demo, DemoConfig, MeshLibrary, Phase, RecordingRenderer, SceneShaders,
    TextureProvider, TextureRegistry, Timeline, Topology, Vec3,
};

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: &Vec3, b: &Vec3) -> bool {
    (a - b).abs().max() < EPSILON
}

fn demo_with(config: &DemoConfig) -> (Demo, MeshLibrary, TextureRegistry) {
    let mut meshes = MeshLibrary::new();
    let mut textures = TextureRegistry::new();
    let shaders = SceneShaders::default();
    let demo = Demo::new(config, &mut meshes, &mut textures, shaders, 16.0 / 9.0).unwrap();
    (demo, meshes, textures)
}

fn record(demo: &Demo) -> RecordingRenderer {
    let mut renderer = RecordingRenderer::new();
    demo.render(&mut renderer);
    renderer
}

#[test]
fn test_full_run_visits_every_phase_in_order() {
    let (mut demo, _, _) = demo_with(&DemoConfig::default());
    let mut seen = vec![demo.phase()];
    let mut time = 0.0;
    while !demo.is_finished() {
        time += 1.0 / 30.0;
        let phase = demo.update(time).phase;
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
    }
    assert_eq!(
        seen,
        [Phase::Cluster, Phase::Rally, Phase::Breakout, Phase::Finished]
    );
    assert!(time >= 31.0 - EPSILON);
}

#[test]
fn test_render_is_read_only() {
    let (mut demo, _, _) = demo_with(&DemoConfig::default());
    demo.update(12.5);
    let first = record(&demo);
    let second = record(&demo);
    assert_eq!(first.commands, second.commands);
    assert_eq!(first.uniforms, second.uniforms);
}

#[test]
fn test_rally_frame_layout() {
    let (mut demo, meshes, _) = demo_with(&DemoConfig::default());
    demo.update(10.0);
    let renderer = record(&demo);
    let shaders = SceneShaders::default();

    // The light sphere goes first, with the emissive shader
    let light = &renderer.commands[0];
    assert_eq!(light.shader, shaders.emissive);
    assert_eq!(light.topology, Topology::Indexed);
    let mesh = meshes.mesh(light.geometry).unwrap();
    assert_eq!(light.count, mesh.draw_count());

    // Everything else is lit cube geometry
    for command in &renderer.commands[1..] {
        assert_eq!(command.shader, shaders.world);
        assert_eq!(command.topology, Topology::Arrays);
        assert_eq!(command.count, 36);
    }

    let uniforms = renderer.uniforms.unwrap();
    let light_world = math::transform_point(&light.model, &Vec3::zeros());
    assert!(vec3_approx(&uniforms.light_position, &light_world));
}

#[test]
fn test_paddles_are_placed_independently() {
    let (mut demo, _, _) = demo_with(&DemoConfig::default());
    demo.update(11.0);
    let paddles = demo.scene().paddles();
    let left = paddles[0].children()[0].model();
    let right = paddles[1].children()[0].model();
    // Same local placement, different world placement
    assert_eq!(left, right);
    assert_ne!(paddles[0].model(), paddles[1].model());
}

#[test]
fn test_view_tracks_camera_target() {
    let (mut demo, _, _) = demo_with(&DemoConfig::default());
    demo.update(9.0);
    let uniforms = demo.uniforms().clone();
    let target = demo.scene().camera_target().position();

    let eye_in_view = math::transform_point(&uniforms.view, &uniforms.eye);
    assert!(eye_in_view.norm() < 1e-3);

    // The target lies straight ahead, down -z
    let target_in_view = math::transform_point(&uniforms.view, &target);
    assert!(target_in_view.x.abs() < 1e-3);
    assert!(target_in_view.y.abs() < 1e-3);
    assert!(target_in_view.z < 0.0);
}

#[test]
fn test_rally_reports_both_cue_kinds() {
    let (mut demo, _, _) = demo_with(&DemoConfig::default());
    let mut cues = Vec::new();
    let mut time = 8.0;
    while time < 28.0 {
        cues.extend(demo.update(time).cues);
        time += 1.0 / 60.0;
    }
    assert!(cues.contains(&AudioCue::PaddleStrike));
    assert!(cues.contains(&AudioCue::TableBounce));
}

#[test]
fn test_custom_timeline_shortens_the_run() {
    let config = DemoConfig {
        timeline: Timeline {
            cluster_seconds: 1.0,
            rally_seconds: 1.0,
            breakout_seconds: 1.0,
        },
        ..DemoConfig::default()
    };
    let (mut demo, _, _) = demo_with(&config);
    assert_eq!(demo.update(1.5).phase, Phase::Rally);
    assert_eq!(demo.update(3.0).phase, Phase::Finished);
}

#[test]
fn test_textures_swap_without_rebuilding() {
    let (mut demo, _, mut textures) = demo_with(&DemoConfig::default());
    demo.update(0.5);
    let before = record(&demo);

    let pending = textures.take_pending();
    assert_eq!(pending.len(), 7);
    for (handle, _) in pending {
        textures.complete(
            handle,
            pong3d_core::TextureImage {
                width: 64,
                height: 64,
                mean_rgba: [90, 60, 30, 255],
            },
        );
    }

    // Handles stay the same; only what they resolve to changed
    let after = record(&demo);
    assert_eq!(before.commands, after.commands);
    let diffuse = after.commands[0].diffuse.unwrap();
    assert_eq!(textures.color(diffuse), [90, 60, 30, 255]);

    // A late request still starts out as the placeholder
    let late = textures.load_texture("imgs/late.png");
    assert!(!textures.is_ready(late));
}
