//! # Segue
//!
//! Queue the next track in cmus from an artist similar to the one playing.
//!
//! ## Usage
//!
//! ```bash
//! # As cmus' status program (cmus supplies the arguments)
//! segue status playing file /music/low/words.flac artist Low title Words
//!
//! # Try a pick without touching the queue
//! segue --dry-run --no-detach artist Low
//!
//! # Inspect what the cache decodes to
//! segue artists
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{debug, info};
use segue::cli::{Args, Command};
use segue::config::Config;
use segue::player::CmusRemote;
use segue::selection::SelectionPolicy;
use segue::similarity::{FixedSimilarity, LastFm, SimilarityProvider};
use segue::status::TrackStatus;
use segue::{app, completion};

/// Main entry point for Segue.
///
/// Initializes logging, parses command-line arguments, merges them into the
/// config file and routes to the selected mode.
///
/// # Logging
///
/// Log output goes to stderr and can be controlled via `RUST_LOG` or `-v`:
/// - `RUST_LOG=debug segue artist Low` - Enable debug logging
/// - `RUST_LOG=segue::cache=trace segue artists` - Module-specific logging
fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.options.log_level()),
    )
    .init();

    let mut config = Config::load(args.options.config.as_deref())?;
    args.options.apply(&mut config);
    config.validate()?;
    debug!("Effective config: {config:?}");

    match args.command {
        Some(Command::Artists) => {
            let decoded = app::load_index(&config)?;
            println!("{}", serde_json::to_string_pretty(&decoded.index)?);
        }
        Some(Command::Completion { shell }) => {
            completion::print_completions(shell, &mut Args::command());
        }
        None => {
            if args.status.is_empty() {
                Args::command().print_help()?;
                return Ok(());
            }
            let status = TrackStatus::from_pairs(args.status)?;
            let player = CmusRemote::new(config.remote_command.clone());
            let provider: Box<dyn SimilarityProvider> = if args.options.offline {
                Box::new(FixedSimilarity::new())
            } else {
                Box::new(LastFm::new(config.lastfm_api_key.clone(), config.lastfm_timeout()))
            };
            let mut policy = SelectionPolicy::new(config.selection);

            let selection = app::run(
                &config,
                &status,
                &player,
                provider.as_ref(),
                &mut policy,
                args.options.dry_run,
            )?;

            if args.options.dry_run {
                println!("{}", selection.path);
            } else {
                info!("Added {} to the {}", selection.path, config.add_to);
            }
        }
    }

    Ok(())
}
