/// Pong3D Terminal Demo
///
/// Plays the demo as ASCII art: an orbiting cube cluster, then a table
/// tennis rally, then the ball escaping. Controls:
///   - Space: Pause / resume
///   - Q/ESC: Quit
///
/// Logging follows `RUST_LOG`. The frame owns the terminal, so pass
/// `--log-file` or redirect stderr (`2>pong3d.log`) to keep the records.
use anyhow::{Context, Result};
use clap::Parser;
use pong3d_core::DemoConfig;
use pong3d_terminal::{log_target, AppOptions, TerminalApp};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pong3d-terminal", version, about = "Pong3D rendered in the terminal")]
struct Args {
    /// Directory the texture paths (imgs/...) are resolved against
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Target frame rate
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Length of the cube cluster phase in seconds
    #[arg(long)]
    cluster_seconds: Option<f32>,

    /// Length of the rally in seconds
    #[arg(long)]
    rally_seconds: Option<f32>,

    /// Length of the breakout in seconds
    #[arg(long)]
    breakout_seconds: Option<f32>,

    /// Vertical field of view in radians
    #[arg(long)]
    fov: Option<f32>,

    /// Do not ring the terminal bell on bounces and strikes
    #[arg(long)]
    mute: bool,

    /// Write log records here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> DemoConfig {
        let mut config = DemoConfig::default();
        if let Some(seconds) = self.cluster_seconds {
            config.timeline.cluster_seconds = seconds;
        }
        if let Some(seconds) = self.rally_seconds {
            config.timeline.rally_seconds = seconds;
        }
        if let Some(seconds) = self.breakout_seconds {
            config.timeline.breakout_seconds = seconds;
        }
        if let Some(fov) = self.fov {
            config.camera.fov = fov;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .target(log_target(args.log_file.as_deref())?)
        .init();
    let config = args.config();
    log::debug!("{config:?}");

    let options = AppOptions {
        assets: args.assets.clone(),
        fps: args.fps,
        mute: args.mute,
    };
    let mut app = TerminalApp::new(&config, &options).context("failed to set up the demo")?;
    app.run().context("terminal loop failed")?;

    println!("Thanks for watching Pong3D!");
    Ok(())
}
