//! Cutframe CLI: headless driver for timeline projects.
//!
//! Usage:
//!   cutframe validate <PROJECT>        Validate a project file
//!   cutframe info <PROJECT>            Show project information
//!   cutframe frame <PROJECT> --at <T>  Compose one frame and print it as JSON
//!   cutframe preview <PROJECT>         Run a headless playback session
//!   cutframe init <NAME>               Create a starter project

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cutframe_common::config::EditorConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "cutframe",
    about = "Timeline compositor and preview engine",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read editor configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file
    Validate {
        /// Path to the project JSON
        path: PathBuf,
    },

    /// Show project information
    Info {
        /// Path to the project JSON
        path: PathBuf,

        /// Print the converted tracks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose a single frame and print its draw list as JSON
    Frame {
        /// Path to the project JSON
        path: PathBuf,

        /// Timeline position (seconds)
        #[arg(long, default_value = "0")]
        at: f64,

        /// Draw the debug overlay into the frame
        #[arg(long)]
        debug_overlay: bool,
    },

    /// Play a project headlessly and report the transport as it advances
    Preview {
        /// Path to the project JSON
        path: PathBuf,

        /// Wall-clock seconds to run for
        #[arg(long, default_value = "5")]
        seconds: f64,

        /// Playback rate
        #[arg(long, default_value = "1")]
        rate: f64,

        /// Start position (seconds)
        #[arg(long, default_value = "0")]
        seek: f64,

        /// Seconds of timeline between reports
        #[arg(long, default_value = "1")]
        every: f64,

        /// Drive the session from the system clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
    },

    /// Create a starter project file
    Init {
        /// Project name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Canvas width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Canvas height
        #[arg(long, default_value = "720")]
        height: u32,

        /// Timeline duration (seconds)
        #[arg(long, default_value = "10")]
        duration: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?,
        None => EditorConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    cutframe_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Info { path, json } => commands::info::run(path, json, &config),
        Commands::Frame {
            path,
            at,
            debug_overlay,
        } => commands::frame::run(path, at, debug_overlay, &config),
        Commands::Preview {
            path,
            seconds,
            rate,
            seek,
            every,
            realtime,
        } => {
            let options = commands::preview::PreviewOptions {
                seconds,
                rate,
                seek,
                every,
            };
            if realtime {
                commands::preview::run_realtime(path, options, &config).await
            } else {
                commands::preview::run_simulated(path, options, &config)
            }
        }
        Commands::Init {
            name,
            output,
            width,
            height,
            duration,
        } => commands::init::run(name, output, width, height, duration),
    }
}
