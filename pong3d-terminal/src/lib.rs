/// Terminal front end: ASCII rasterizer, texture loader and frame loop
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use anyhow::Context;
use env_logger::Target;
use pong3d_core::{
    AudioCue, AudioSink, Demo, DemoConfig, MeshLibrary, SceneShaders, Silent, TextureRegistry,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod textures;

pub use renderer::{AsciiRenderer, FrameTarget};
pub use textures::TextureLoader;

/// Minimum gap between two bells for the same cue
pub const BELL_COOLDOWN: Duration = Duration::from_millis(150);

/// Front-end settings that are not part of the demo itself
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub assets: PathBuf,
    pub fps: u32,
    /// Drop audio cues instead of ringing the bell
    pub mute: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("."),
            fps: 30,
            mute: false,
        }
    }
}

/// Where log records go while the frame owns the screen.
///
/// An explicit `log_file` always wins. Otherwise records go to stderr only
/// when it is redirected; an interactive stderr shares the alternate screen
/// with the frame, so the records are dropped there.
pub fn log_target(log_file: Option<&Path>) -> anyhow::Result<Target> {
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            Ok(Target::Pipe(Box::new(file)))
        }
        None if io::stderr().is_terminal() => Ok(Target::Pipe(Box::new(io::sink()))),
        None => Ok(Target::Stderr),
    }
}

/// Audio sink that rings the terminal bell, rate limited per cue kind.
#[derive(Debug, Default)]
pub struct Bell {
    last_rung: HashMap<AudioCue, Instant>,
    pending: bool,
}

impl Bell {
    /// Record `cue` at `now`; true if it is far enough from the previous
    /// bell of the same kind to be heard.
    pub fn allow(&mut self, cue: AudioCue, now: Instant) -> bool {
        match self.last_rung.get(&cue) {
            Some(last) if now.saturating_duration_since(*last) < BELL_COOLDOWN => false,
            _ => {
                self.last_rung.insert(cue, now);
                true
            }
        }
    }

    /// Whether a bell is due on the next frame; clears the flag.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for Bell {
    fn play(&mut self, cue: AudioCue) {
        if self.allow(cue, Instant::now()) {
            log::debug!("bell for {cue:?}");
            self.pending = true;
        }
    }
}

/// Wall clock that stops while the demo is paused.
#[derive(Debug)]
struct DemoClock {
    started: Instant,
    paused_total: Duration,
    paused_at: Option<Instant>,
}

impl DemoClock {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            paused_total: Duration::ZERO,
            paused_at: None,
        }
    }

    fn toggle(&mut self) {
        match self.paused_at.take() {
            Some(at) => self.paused_total += at.elapsed(),
            None => self.paused_at = Some(Instant::now()),
        }
    }

    fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    fn seconds(&self) -> f32 {
        let now = self.paused_at.unwrap_or_else(Instant::now);
        now.saturating_duration_since(self.started)
            .saturating_sub(self.paused_total)
            .as_secs_f32()
    }
}

/// Terminal cells are about twice as tall as they are wide.
fn cell_aspect(width: u16, height: u16) -> f32 {
    width as f32 / (2.0 * height.max(1) as f32)
}

/// Main application struct for terminal rendering of the demo
pub struct TerminalApp {
    demo: Demo,
    meshes: MeshLibrary,
    textures: TextureRegistry,
    loader: TextureLoader,
    canvas: AsciiRenderer,
    shaders: SceneShaders,
    bell: Bell,
    mute: bool,
    clock: DemoClock,
    frame_interval: Duration,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: &DemoConfig, options: &AppOptions) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        let shaders = SceneShaders::default();
        let mut meshes = MeshLibrary::new();
        let mut textures = TextureRegistry::new();
        let aspect = cell_aspect(width, height);
        let demo = Demo::new(config, &mut meshes, &mut textures, shaders, aspect)?;

        let mut loader = TextureLoader::new(&options.assets);
        loader.dispatch(&mut textures);
        log::info!(
            "{} geometries built, {} textures loading from {}",
            meshes.len(),
            loader.in_flight(),
            options.assets.display()
        );

        Ok(Self {
            demo,
            meshes,
            textures,
            loader,
            canvas: AsciiRenderer::new(width as usize, height as usize),
            shaders,
            bell: Bell::default(),
            mute: options.mute,
            clock: DemoClock::new(),
            frame_interval: Duration::from_millis(1000 / u64::from(options.fps.max(1))),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            if self.demo.is_finished() {
                log::info!("demo finished");
                self.running = false;
            }

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_interval {
                std::thread::sleep(self.frame_interval - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => {
                    self.clock.toggle();
                    log::info!("paused: {}", self.clock.is_paused());
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.canvas.resize(width as usize, height as usize);
                if let Err(err) = self.demo.set_aspect(cell_aspect(width, height)) {
                    log::warn!("keeping previous projection after resize: {err}");
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn update(&mut self) {
        // Textures swap only between frames
        self.loader.apply(&mut self.textures);

        if self.clock.is_paused() {
            return;
        }
        let frame = self.demo.update(self.clock.seconds());
        if self.mute {
            frame.play(&mut Silent);
        } else {
            frame.play(&mut self.bell);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let mut target = FrameTarget::new(
            &mut self.canvas,
            &self.meshes,
            &self.textures,
            self.shaders.emissive,
        );
        self.demo.render(&mut target);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.canvas.draw(&mut stdout)?;

        if self.bell.take() {
            queue!(stdout, Print('\x07'))?;
        }

        // Draw UI overlay
        let loading = match self.loader.in_flight() {
            0 => String::new(),
            n => format!(" | loading {n} textures"),
        };
        let paused = if self.clock.is_paused() { " | PAUSED" } else { "" };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Pong3D | {:?} | FPS: {:.1}{}{} | Space=Pause Q=Quit",
                self.demo.phase(),
                self.fps,
                loading,
                paused
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
