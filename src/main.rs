//! weekreel CLI
//!
//! Keeps a one-clip-a-day journal for the current ISO week and stitches each
//! week's clips into a single slow-motion film with ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! weekreel add-clip --file today.mp4
//! weekreel status
//! weekreel stitch --week 2026-W02 --audio track.mp3
//! weekreel history --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use weekreel::adapters::TomlConfigAdapter;
use weekreel::app::DefaultAppContainer;
use weekreel::cli::{commands, Cli, Commands};
use weekreel::utils::logging::LoggingSystem;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TomlConfigAdapter::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    LoggingSystem::new(config.logging.clone()).initialize()?;
    debug!(data_dir = %config.paths.data_dir.display(), "Configuration loaded");

    let container = DefaultAppContainer::new(&config).await?;

    match cli.command {
        Commands::Status(args) => commands::status(&container, args).await?,
        Commands::AddClip(args) => commands::add_clip(&container, &config, args).await?,
        Commands::Rotate(args) => commands::rotate(&container, args).await?,
        Commands::Plan(args) => commands::plan(&container, args).await?,
        Commands::Stitch(args) => {
            info!("Executing stitch command");
            commands::stitch(&container, args).await?
        }
        Commands::History(args) => commands::history(&container, args).await?,
        Commands::SetOutput(args) => commands::set_output(&container, args).await?,
        Commands::Onboard => commands::onboard(&container).await?,
    }

    Ok(())
}
