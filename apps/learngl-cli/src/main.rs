mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use learngl_camera::{Camera, Movement};
use tracing_subscriber::EnvFilter;

use crate::config::SessionConfig;
use crate::session::{FlyScript, PoseReport};

#[derive(Parser)]
#[command(
    name = "learngl-cli",
    about = "Drive the camera and shader components without a window"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML session config (camera, projection, shader paths)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Run a scripted fly session and print the final camera pose
    Fly {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Movement keys held every frame (repeatable)
        #[arg(short, long = "key", value_enum)]
        keys: Vec<Key>,
        /// Horizontal pointer delta per frame
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        mouse_dx: f32,
        /// Vertical pointer delta per frame
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        mouse_dy: f32,
        /// Scroll delta per frame
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        scroll: f32,
        /// Let pitch pass +/-89 degrees
        #[arg(long)]
        no_constrain_pitch: bool,
        /// Print the pose as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile and link a shader pair headlessly and upload camera matrices
    Check {
        /// Vertex shader source (defaults to the config's shaders.vertex)
        vertex: Option<PathBuf>,
        /// Fragment shader source (defaults to the config's shaders.fragment)
        fragment: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Key {
    Forward,
    Backward,
    Left,
    Right,
}

impl From<Key> for Movement {
    fn from(key: Key) -> Self {
        match key {
            Key::Forward => Movement::Forward,
            Key::Backward => Movement::Backward,
            Key::Left => Movement::Left,
            Key::Right => Movement::Right,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = SessionConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("learngl-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("camera: {}", learngl_camera::crate_info());
            println!("shader: {}", learngl_shader::crate_info());
        }
        Commands::Fly {
            frames,
            dt,
            keys,
            mouse_dx,
            mouse_dy,
            scroll,
            no_constrain_pitch,
            json,
        } => {
            let mut camera = Camera::from_config(&settings.camera);
            let script = FlyScript {
                frames,
                delta_time: dt.max(0.0),
                keys: keys.into_iter().map(Movement::from).collect(),
                mouse_dx,
                mouse_dy,
                scroll,
                constrain_pitch: settings.constrain_pitch && !no_constrain_pitch,
            };
            session::fly(&mut camera, &script);

            let report = PoseReport::from_camera(&camera);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render_text());
            }
        }
        Commands::Check { vertex, fragment } => {
            let configured = settings.shaders.clone();
            let vertex = vertex
                .or_else(|| configured.as_ref().map(|s| s.vertex.clone()))
                .context("no vertex shader given on the command line or in the config")?;
            let fragment = fragment
                .or_else(|| configured.as_ref().map(|s| s.fragment.clone()))
                .context("no fragment shader given on the command line or in the config")?;

            let camera = Camera::from_config(&settings.camera);
            let report =
                session::check_shaders(&vertex, &fragment, &camera, &settings.projection)?;

            println!("declared uniforms: {}", report.declared.join(", "));
            for status in &report.matrices {
                let state = if status.resolved { "uploaded" } else { "not found" };
                println!("  {:<12} {state}", status.name);
            }
        }
    }

    Ok(())
}
