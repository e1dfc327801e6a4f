//! # Selection Run
//!
//! One invocation from cmus, start to finish:
//!
//! ```text
//! status args → player reachable? → detach → lib.pl + cache → ArtistIndex
//!             → similar artists → SelectionPolicy → cmus-remote
//! ```
//!
//! Decode problems and a failed similarity lookup only warn. Running out of
//! candidates, or having nothing to choose from at all, ends the run with an
//! error.

use crate::cache::{self, Decoded};
use crate::config::Config;
use crate::error::SelectError;
use crate::library::LibrarySet;
use crate::player::{self, Player};
use crate::selection::{Selection, SelectionPolicy};
use crate::similarity::SimilarityProvider;
use crate::status::TrackStatus;
use anyhow::{bail, Result};
use log::{info, warn};
use rand::Rng;

/// Loads the library filter (if enabled) and decodes the cache.
///
/// Missing files only warn and give empty results.
///
/// # Errors
///
/// Returns an error if the cmus paths cannot be resolved.
pub fn load_index(config: &Config) -> Result<Decoded> {
    let library = if config.only_library_tracks {
        Some(LibrarySet::load_or_empty(&config.library_path()?))
    } else {
        None
    };

    let cache_path = config.cache_path()?;
    let decoded = match cache::read_cache(&cache_path, library.as_ref(), config.word_size) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("{e:#}");
            Decoded::default()
        }
    };
    decoded.log_warnings();
    Ok(decoded)
}

/// Chooses a track similar to the one in `status` and hands it to `player`.
///
/// With `dry_run` the choice is returned without contacting the player
/// beyond the liveness check.
///
/// # Errors
///
/// Returns an error if the player is unreachable, no track is known at all,
/// selection exhausts its candidates, or the player rejects the request.
pub fn run<P, S, R>(
    config: &Config,
    status: &TrackStatus,
    player: &P,
    provider: S,
    policy: &mut SelectionPolicy<R>,
    dry_run: bool,
) -> Result<Selection>
where
    P: Player,
    S: SimilarityProvider,
    R: Rng,
{
    let Some(artist) = status.artist() else {
        bail!("no artist given");
    };

    if !player.is_running() {
        bail!("cmus not running or {} not working", config.remote_command);
    }

    if config.detach {
        player::detach();
    }

    let decoded = load_index(config)?;
    if decoded.index.track_count() == 0 {
        let err = SelectError::NoTrackAvailable {
            artist: artist.to_string(),
        };
        return Err(anyhow::Error::new(err).context("no artists in library / cache"));
    }
    info!(
        "{} artists and {} tracks available",
        decoded.index.len(),
        decoded.index.track_count()
    );

    let selection = policy.select(&decoded.index, artist, provider)?;

    if dry_run {
        return Ok(selection);
    }
    player.enqueue(&selection.path, config.add_to)?;
    Ok(selection)
}
