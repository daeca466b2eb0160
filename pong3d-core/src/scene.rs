/// Scene composer: named hierarchies, per-phase choreography and draw order
///
/// Every node transform is a closed-form function of the active phase and
/// the time spent in it. `tick` keeps no state between calls, so replaying
/// any (phase, time) pair reproduces the same frame.
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::audio::AudioCue;
use crate::config::{DemoConfig, Timeline};
use crate::error::SceneError;
use crate::geometry::{GeometryKind, GeometryProvider};
use crate::math::{self, Vec3};
use crate::node::{Geometry, Node, NodeKind};
use crate::phase::Phase;
use crate::render::{Renderer, SceneShaders};
use crate::texture::{TextureHandle, TextureProvider};

pub const BOARD_TEXTURE: &str = "imgs/board.png";
pub const BOARD_SPECULAR_TEXTURE: &str = "imgs/board_specular.png";
pub const PADDLE_TEXTURE: &str = "imgs/paddle.png";
pub const PADDLE_SPECULAR_TEXTURE: &str = "imgs/paddle_specular.png";
pub const WOOD_TEXTURE: &str = "imgs/wood.png";
pub const PLAIN_SPECULAR_TEXTURE: &str = "imgs/plain_specular.png";
pub const FLOOR_TEXTURE: &str = "imgs/floor.png";

/// Paddles sit just outside the ball's x range.
const PADDLE_X: f32 = 7.0;
const BALL_X_RANGE: f32 = 6.8;
const BALL_Z_RANGE: f32 = 1.4;
/// Distance from a turn-around or the table that counts as contact
const CONTACT_WINDOW: f32 = 0.05;
/// Ball speed once it escapes the rally
const BREAKOUT_SPEED: f32 = 6.0;

const ARM_REACH: f32 = 1.3;
const TIP_REACH: f32 = 0.65;
const CLUSTER_AXES: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// Texture handles requested while building the scene
#[derive(Debug, Clone, Copy)]
struct SceneTextures {
    board: TextureHandle,
    board_specular: TextureHandle,
    paddle: TextureHandle,
    paddle_specular: TextureHandle,
    wood: TextureHandle,
    plain_specular: TextureHandle,
    floor: TextureHandle,
}

impl SceneTextures {
    fn load(provider: &mut impl TextureProvider) -> Self {
        Self {
            board: provider.load_texture(BOARD_TEXTURE),
            board_specular: provider.load_texture(BOARD_SPECULAR_TEXTURE),
            paddle: provider.load_texture(PADDLE_TEXTURE),
            paddle_specular: provider.load_texture(PADDLE_SPECULAR_TEXTURE),
            wood: provider.load_texture(WOOD_TEXTURE),
            plain_specular: provider.load_texture(PLAIN_SPECULAR_TEXTURE),
            floor: provider.load_texture(FLOOR_TEXTURE),
        }
    }
}

/// Ball state at one instant of the rally
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSample {
    pub position: Vec3,
    /// Ball is turning around at a paddle
    pub paddle_contact: bool,
    /// Ball is touching the table
    pub table_contact: bool,
}

/// Ball position along the rally at choreography time `time`. Any finite
/// time is valid, negative included.
///
/// x sweeps paddle to paddle with eased turn-arounds, y is a bounce and z
/// drifts on a slow triangle wave.
pub fn ball_path(time: f32) -> BallSample {
    let t = (time + FRAC_PI_2) / 2.0;
    let along = t - t.floor();
    let eased = along.powf(0.8);
    let sweep = if is_even(t) { eased } else { 1.0 - eased };
    let x = sweep * 2.0 * BALL_X_RANGE - BALL_X_RANGE;

    let y = (t * PI + 1.2).sin().abs();

    let drift = t / 5.0;
    let along_drift = drift - drift.floor();
    let wave = if is_even(drift) {
        along_drift
    } else {
        1.0 - along_drift
    };
    let z = wave * 2.0 * BALL_Z_RANGE - BALL_Z_RANGE;

    BallSample {
        position: Vec3::new(x, y, z),
        paddle_contact: along < CONTACT_WINDOW || along > 1.0 - CONTACT_WINDOW,
        table_contact: y < CONTACT_WINDOW,
    }
}

/// Paddle tilt about z at choreography time `time`. Rests at -1 rad and
/// flicks up briefly once per stroke.
pub fn paddle_swing(time: f32) -> f32 {
    (4.0 * (time * FRAC_PI_2 + PI / 7.0).sin() - 3.5).max(-1.0)
}

fn is_even(t: f32) -> bool {
    (t.floor() as i64).rem_euclid(2) == 0
}

/// The demo's hierarchies and their choreography.
#[derive(Debug, Clone)]
pub struct Scene {
    timeline: Timeline,
    orbit_radius: f32,
    cluster: Node,
    backdrop: Node,
    table: Node,
    paddles: [Node; 2],
    floor: Node,
    light: Node,
    camera_target: Node,
}

impl Scene {
    /// Request every geometry and texture and wire up the hierarchies.
    pub fn build(
        geometry: &mut impl GeometryProvider,
        textures: &mut impl TextureProvider,
        config: &DemoConfig,
    ) -> Result<Self, SceneError> {
        let tex = SceneTextures::load(textures);
        let unit = Geometry::build(geometry, GeometryKind::Cube { side: 1.0 })?;
        let unit_cube = NodeKind::Cube(unit);

        let cluster = build_cluster(geometry, &tex)?;
        let backdrop = build_backdrop(unit_cube, &tex);
        let table = build_table(unit_cube, &tex);
        let paddles = [
            build_paddle("paddle1", -PADDLE_X, unit_cube, &tex),
            build_paddle("paddle2", PADDLE_X, unit_cube, &tex),
        ];

        let mut floor = Node::new("floor", unit_cube);
        floor.set_scale(50.0, 1.0, 50.0);
        floor.set_position(0.0, -1.9, 0.0);
        floor.attach_diffuse_texture(tex.floor);
        floor.attach_specular_texture(tex.plain_specular);

        let mut light = Node::sphere("light", geometry, 20, 0.05)?;
        light.attach_diffuse_texture(tex.plain_specular);

        log::debug!("scene assembled");

        let mut scene = Self {
            timeline: config.timeline,
            orbit_radius: config.camera.orbit_radius,
            cluster,
            backdrop,
            table,
            paddles,
            floor,
            light,
            camera_target: Node::empty("camera_target"),
        };
        scene.tick(Phase::Cluster, 0.0);
        Ok(scene)
    }

    pub fn cluster(&self) -> &Node {
        &self.cluster
    }

    pub fn backdrop(&self) -> &Node {
        &self.backdrop
    }

    pub fn table(&self) -> &Node {
        &self.table
    }

    pub fn paddles(&self) -> &[Node; 2] {
        &self.paddles
    }

    pub fn floor(&self) -> &Node {
        &self.floor
    }

    pub fn light(&self) -> &Node {
        &self.light
    }

    pub fn camera_target(&self) -> &Node {
        &self.camera_target
    }

    /// Pose every animated node for `phase` at `time` seconds into it and
    /// return the audio cues due on this frame.
    pub fn tick(&mut self, phase: Phase, time: f32) -> Vec<AudioCue> {
        match phase {
            Phase::Cluster => {
                self.pose_cluster(time);
                Vec::new()
            }
            Phase::Rally => self.pose_rally(time),
            Phase::Breakout => {
                self.pose_breakout(time);
                Vec::new()
            }
            Phase::Finished => {
                self.pose_breakout(self.timeline.breakout_seconds);
                Vec::new()
            }
        }
    }

    /// Issue this phase's draw calls. Roots go in a fixed order; emissive
    /// objects use their own shader.
    pub fn draw(&self, phase: Phase, renderer: &mut dyn Renderer, shaders: &SceneShaders) {
        let identity = math::identity();
        match phase {
            Phase::Cluster => {
                self.backdrop
                    .draw_hierarchy(renderer, shaders.world, &identity);
                self.cluster
                    .draw_hierarchy(renderer, shaders.emissive, &identity);
            }
            Phase::Rally | Phase::Breakout | Phase::Finished => {
                self.light.draw(renderer, shaders.emissive);
                self.table.draw_hierarchy(renderer, shaders.world, &identity);
                for paddle in &self.paddles {
                    paddle.draw_hierarchy(renderer, shaders.world, &identity);
                }
            }
        }
        self.floor.draw(renderer, shaders.world);
    }

    /// Camera eye and look-at target for `phase` at `time`.
    pub fn camera_pose(&self, phase: Phase, time: f32) -> (Vec3, Vec3) {
        let angle = (time / 2.0).sin() / 1.5 + FRAC_PI_2;
        let (height, target) = match phase {
            Phase::Cluster => (0.0, self.cluster.position() / 1.3),
            _ => (4.0, self.camera_target.position()),
        };
        let eye = Vec3::new(
            self.orbit_radius * angle.cos(),
            height,
            self.orbit_radius * angle.sin(),
        );
        (eye, target)
    }

    /// Where the scene's light sits for `phase`.
    pub fn light_position(&self, phase: Phase) -> Vec3 {
        match phase {
            Phase::Cluster => self.cluster.position(),
            _ => self.light.position(),
        }
    }

    fn pose_cluster(&mut self, t: f32) {
        let root = &mut self.cluster;
        root.set_position(4.0 * (t / 2.0).cos(), 1.5 * (t / 3.0).sin(), 4.0 * (t / 2.0).sin());
        root.rotate_x(t);
        root.rotate_y(t * 0.7);
        root.rotate_z(t * 0.3);

        let pulse = (2.0 * t).sin();
        for (index, axis) in CLUSTER_AXES.iter().enumerate() {
            let Some(arm) = root.child_mut(index) else {
                continue;
            };
            let reach = ARM_REACH * pulse;
            arm.set_position(axis[0] * reach, axis[1] * reach, axis[2] * reach);
            if let Some(tip) = arm.child_mut(0) {
                let reach = TIP_REACH * pulse;
                tip.set_position(axis[0] * reach, axis[1] * reach, axis[2] * reach);
            }
        }
    }

    fn pose_rally(&mut self, t: f32) -> Vec<AudioCue> {
        self.camera_target.set_position(0.0, (8.0 - 4.0 * t).max(1.0), 0.0);

        let t = t * 2.0;
        let ball = ball_path(t);
        let position = ball.position;
        self.light.set_position(position.x, position.y, position.z);

        let [left, right] = &mut self.paddles;
        left.set_position(-PADDLE_X, 0.5, position.z);
        right.set_position(PADDLE_X, 0.5, position.z);
        left.rotate_z(-paddle_swing(t + 2.0));
        right.rotate_z(paddle_swing(t));

        let mut cues = Vec::new();
        if ball.table_contact {
            cues.push(AudioCue::TableBounce);
        }
        if ball.paddle_contact {
            cues.push(AudioCue::PaddleStrike);
        }
        cues
    }

    fn pose_breakout(&mut self, t: f32) {
        // Paddles and camera hold their last rally pose.
        self.pose_rally(self.timeline.rally_seconds);
        self.light.translate(BREAKOUT_SPEED * t, 0.0, 0.0);
    }
}

/// Root cube with six arms, one per ±axis, each carrying a smaller cube.
fn build_cluster(
    geometry: &mut impl GeometryProvider,
    tex: &SceneTextures,
) -> Result<Node, SceneError> {
    let arm_cube = NodeKind::Cube(Geometry::build(geometry, GeometryKind::Cube { side: 0.25 })?);
    let tip_cube = NodeKind::Cube(Geometry::build(geometry, GeometryKind::Cube { side: 0.125 })?);

    let mut root = Node::cube("cluster", geometry, 0.5)?;
    root.attach_diffuse_texture(tex.wood);
    for index in 0..CLUSTER_AXES.len() {
        let mut arm = Node::new(format!("cluster.arm{index}"), arm_cube);
        arm.attach_diffuse_texture(tex.wood);
        let mut tip = Node::new(format!("cluster.arm{index}.tip"), tip_cube);
        tip.attach_diffuse_texture(tex.wood);
        arm.add_child(tip);
        root.add_child(arm);
    }
    Ok(root)
}

/// Back wall behind the cluster: a centre plate at z = -6 and four plates
/// tilted 45° towards the viewer around it.
fn build_backdrop(unit_cube: NodeKind, tex: &SceneTextures) -> Node {
    let mut backdrop = Node::empty("backdrop");
    // (x, y, rotate_x, rotate_z)
    let plates = [
        ("backdrop.bottom", 0.0, -4.0, FRAC_PI_4, 0.0),
        ("backdrop.top", 0.0, 4.0, -FRAC_PI_4, 0.0),
        ("backdrop.right", 4.0, 0.0, FRAC_PI_2, FRAC_PI_4),
        ("backdrop.left", -4.0, 0.0, FRAC_PI_2, -FRAC_PI_4),
    ];
    for (name, x, y, rx, rz) in plates {
        let mut plate = Node::new(name, unit_cube);
        plate.set_position(x, y, -4.0);
        plate.rotate_x(rx);
        plate.rotate_z(rz);
        plate.set_scale(4.0, 1.0, 4.0);
        plate.attach_diffuse_texture(tex.floor);
        plate.attach_specular_texture(tex.plain_specular);
        backdrop.add_child(plate);
    }

    let mut centre = Node::new("backdrop.centre", unit_cube);
    centre.set_position(0.0, 0.0, -6.0);
    centre.rotate_x(FRAC_PI_2);
    centre.set_scale(4.0, 1.0, 4.0);
    centre.attach_diffuse_texture(tex.floor);
    centre.attach_specular_texture(tex.plain_specular);
    backdrop.add_child(centre);
    backdrop
}

fn build_table(unit_cube: NodeKind, tex: &SceneTextures) -> Node {
    let mut table = Node::empty("table");
    table.set_position(0.0, -0.1, 0.0);

    for (name, x) in [("table.board1", -2.0), ("table.board2", 2.0)] {
        let mut board = Node::new(name, unit_cube);
        board.rotate_y(FRAC_PI_2);
        board.set_position(x, 0.0, 0.0);
        board.set_scale(4.0, 0.1, 4.0);
        board.attach_diffuse_texture(tex.board);
        board.attach_specular_texture(tex.board_specular);
        table.add_child(board);
    }

    let mut bar = Node::new("table.bar", unit_cube);
    bar.set_scale(0.1, 0.1, 4.0);
    bar.set_position(0.0, 0.35, 0.0);
    bar.attach_diffuse_texture(tex.wood);
    bar.attach_specular_texture(tex.plain_specular);
    table.add_child(bar);

    let middle_legs = [("table.mleg1", -2.05), ("table.mleg2", 2.05)];
    for (name, z) in middle_legs {
        let mut leg = Node::new(name, unit_cube);
        leg.set_scale(0.1, 3.0, 0.1);
        leg.set_position(0.0, -1.1, z);
        leg.attach_diffuse_texture(tex.wood);
        leg.attach_specular_texture(tex.plain_specular);
        table.add_child(leg);
    }

    let corners = [(-3.9, -1.9), (-3.9, 1.9), (3.9, -1.9), (3.9, 1.9)];
    for (index, (x, z)) in corners.into_iter().enumerate() {
        let mut leg = Node::new(format!("table.cleg{index}"), unit_cube);
        leg.set_scale(0.1, 2.0, 0.1);
        leg.set_position(x, -1.0, z);
        leg.attach_diffuse_texture(tex.wood);
        leg.attach_specular_texture(tex.plain_specular);
        table.add_child(leg);
    }

    table
}

/// Paddle root owning its own plate and stick placements.
fn build_paddle(name: &str, x: f32, unit_cube: NodeKind, tex: &SceneTextures) -> Node {
    let mut plate = Node::new(format!("{name}.plate"), unit_cube);
    plate.set_position(0.0, 0.5, 0.0);
    plate.set_scale(0.7, 0.7, 0.12);
    plate.rotate_y(FRAC_PI_2);
    plate.attach_diffuse_texture(tex.paddle);
    plate.attach_specular_texture(tex.paddle_specular);

    let mut stick = Node::new(format!("{name}.stick"), unit_cube);
    stick.set_position(0.0, -0.35, 0.0);
    stick.set_scale(0.1, 1.0, 0.1);
    stick.attach_diffuse_texture(tex.wood);
    stick.attach_specular_texture(tex.plain_specular);

    let mut paddle = Node::empty(name);
    paddle.set_scale(0.7, 0.7, 0.7);
    paddle.set_position(x, 0.4, 0.0);
    paddle.add_child(plate);
    paddle.add_child(stick);
    paddle
}
