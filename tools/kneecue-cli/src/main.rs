//! KneeCue CLI: run knee-angle sessions from recordings or synthetic motion.
//!
//! Usage:
//!   kneecue replay <FILE>    Replay a recorded detector stream
//!   kneecue simulate         Run a session over generated squats
//!   kneecue check            Validate configuration and landmark mapping
//!   kneecue config           Show or reset the stored configuration
//!
//! Host messages are written to stdout as JSONL; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use kneecue_common::config::{AppConfig, LegSide, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "kneecue",
    about = "Knee angle tracking and squat cues from pose landmarks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Read configuration from this file instead of the standard location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Leg to track.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Side {
    Left,
    Right,
}

impl From<Side> for LegSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => LegSide::Left,
            Side::Right => LegSide::Right,
        }
    }
}

/// Cue and pacing overrides shared by session commands.
#[derive(Debug, Clone, clap::Args)]
pub struct TuningArgs {
    /// Frame loop rate in Hz (0 = as fast as frames arrive)
    #[arg(long)]
    fps: Option<u32>,

    /// Knee angle below which a cue is considered (degrees)
    #[arg(long)]
    threshold_deg: Option<f64>,

    /// Minimum time between cues (milliseconds)
    #[arg(long)]
    cooldown_ms: Option<f64>,

    /// Leg to track
    #[arg(long, value_enum)]
    side: Option<Side>,

    /// Print a session summary to stderr when done
    #[arg(long)]
    summary: bool,
}

impl TuningArgs {
    /// Apply overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(fps) = self.fps {
            config.frame_loop.target_fps = fps;
        }
        if let Some(threshold) = self.threshold_deg {
            config.cue.threshold_deg = threshold;
        }
        if let Some(cooldown) = self.cooldown_ms {
            config.cue.cooldown_ms = cooldown;
        }
        if let Some(side) = self.side {
            config.landmarks.side = side.into();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded detector stream (JSONL) through a session
    Replay {
        /// Path to the recording
        file: PathBuf,

        /// Deliver frames at their recorded pace
        #[arg(long)]
        realtime: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Run a session over generated squat motion
    Simulate {
        /// Number of squat repetitions
        #[arg(long, default_value = "5")]
        reps: u32,

        /// Knee angle at the bottom of each rep (degrees)
        #[arg(long, default_value = "70.0")]
        depth_deg: f64,

        /// Duration of one rep (milliseconds)
        #[arg(long, default_value = "2000.0")]
        period_ms: f64,

        /// Fraction of frames with no detected body [0.0, 1.0]
        #[arg(long, default_value = "0.0")]
        dropout: f64,

        /// Rate of generated frames
        #[arg(long, default_value = "30")]
        camera_fps: u32,

        /// Deliver frames at their generated pace
        #[arg(long)]
        realtime: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Validate configuration and the landmark mapping
    Check {
        /// Also check that this recording parses
        #[arg(long)]
        recording: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Overwrite the stored configuration with defaults
        #[arg(long)]
        reset: bool,

        /// Print only the configuration file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    kneecue_common::logging::init_logging(&LoggingConfig {
        level,
        json: cli.json_logs || config.logging.json,
    });

    match cli.command {
        Commands::Replay {
            file,
            realtime,
            tuning,
        } => commands::replay::run(config, file, realtime, tuning).await,
        Commands::Simulate {
            reps,
            depth_deg,
            period_ms,
            dropout,
            camera_fps,
            realtime,
            tuning,
        } => {
            commands::simulate::run(
                config, reps, depth_deg, period_ms, dropout, camera_fps, realtime, tuning,
            )
            .await
        }
        Commands::Check { recording } => commands::check::run(&config, recording),
        Commands::Config { reset, path } => commands::config::run(config, reset, path),
    }
}
