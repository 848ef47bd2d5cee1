//! CLI module for weekreel
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::toml_config::PathsSection;
use crate::adapters::AppConfig;
use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

pub use args::{
    AddClipArgs, HistoryArgs, PlanArgs, RotateArgs, SetOutputArgs, StatusArgs, StitchArgs,
};

/// weekreel - one short clip a day, one film a week
///
/// Tracks daily clips for the current ISO week, rotates finished weeks into
/// history and stitches a week's clips into a single slow-motion film.
#[derive(Parser, Debug)]
#[command(name = "weekreel")]
#[command(about = "Daily clip journal: track the week, stitch the film")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./weekreel.toml when present)
    #[arg(long, global = true, env = "WEEKREEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the saved state
    #[arg(long, global = true, env = "WEEKREEL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Logging format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply global flags on top of the loaded configuration. A custom
    /// data directory also moves the default film directory under it.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(data_dir) = &self.data_dir {
            if config.paths.output_dir == PathsSection::default().output_dir {
                config.paths.output_dir = data_dir.join("weekly");
            }
            config.paths.data_dir = data_dir.clone();
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current week
    Status(StatusArgs),
    /// Record a clip for a day of the current week
    AddClip(AddClipArgs),
    /// Retire the current week if a new one has started
    Rotate(RotateArgs),
    /// Print the stitch plan for a week as JSON
    Plan(PlanArgs),
    /// Render a week's film
    Stitch(StitchArgs),
    /// List past weeks
    History(HistoryArgs),
    /// Record an already rendered film for a week
    SetOutput(SetOutputArgs),
    /// Mark onboarding as complete
    Onboard,
}
