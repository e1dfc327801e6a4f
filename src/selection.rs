//! # Artist Selection Policy
//!
//! Picks the next track from the [`ArtistIndex`] given the artist that is
//! playing now. The ranked similar-artist list is treated as a prior, not a
//! strict order:
//!
//! 1. Keep only similar artists the index knows about, in rank order.
//! 2. With probability `jumpout_epsilon`, or when nothing is left, ignore
//!    similarity and try every artist in the index in random order.
//! 3. Otherwise split the list at `floor(len * most_similar_fraction)` into a
//!    most-similar and a lesser-similar tier and shuffle each tier. With
//!    probability `epsilon` the lesser tier goes first (explore), else the
//!    most-similar tier does (exploit).
//! 4. Walk the candidates; for each artist shuffle its files and take the
//!    first one that still exists. The first artist with a hit wins.
//!
//! Every run is independent: nothing is remembered between selections.

use crate::error::SelectError;
use crate::index::ArtistIndex;
use crate::similarity::SimilarityProvider;
use anyhow::{ensure, Result};
use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Selection tunables. All three are probabilities or fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Share of the filtered similarity list that forms the most-similar tier.
    pub most_similar_fraction: f64,
    /// Chance of trying the lesser-similar tier first.
    pub epsilon: f64,
    /// Chance of ignoring similarity altogether.
    pub jumpout_epsilon: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            most_similar_fraction: 0.25,
            epsilon: 0.2,
            jumpout_epsilon: 0.05,
        }
    }
}

impl SelectionConfig {
    /// # Errors
    ///
    /// Returns an error if any value is outside `[0, 1]` or not a number.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("most_similar_fraction", self.most_similar_fraction),
            ("epsilon", self.epsilon),
            ("jumpout_epsilon", self.jumpout_epsilon),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "{name} must be between 0 and 1, got {value}"
            );
        }
        Ok(())
    }
}

/// How the candidate order was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Most-similar tier first.
    Exploit,
    /// Lesser-similar tier first.
    Explore,
    /// Random draw said to ignore similarity.
    JumpOut,
    /// No similar artist is in the index.
    Random,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exploit => "most similar first",
            Self::Explore => "less similar first",
            Self::JumpOut => "jump-out",
            Self::Random => "random",
        };
        f.write_str(name)
    }
}

/// Ordered artists to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub strategy: Strategy,
    pub artists: Vec<String>,
}

/// The chosen track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub artist: String,
    pub path: String,
    pub strategy: Strategy,
}

/// Epsilon-greedy selection over a similarity ranking.
#[derive(Debug)]
pub struct SelectionPolicy<R = ThreadRng> {
    config: SelectionConfig,
    rng: R,
}

impl SelectionPolicy<ThreadRng> {
    #[must_use]
    pub fn new(config: SelectionConfig) -> Self {
        Self::with_rng(config, thread_rng())
    }
}

impl<R: Rng> SelectionPolicy<R> {
    #[must_use]
    pub fn with_rng(config: SelectionConfig, rng: R) -> Self {
        Self { config, rng }
    }

    #[must_use]
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Chooses a track similar to `query_artist` that exists on disk.
    ///
    /// # Algorithm
    ///
    /// 1. Ask `provider` for similar artists and keep those in `index`.
    /// 2. With probability `jumpout_epsilon`, or when nothing is left, use
    ///    every indexed artist in random order.
    /// 3. Otherwise split the list into the most similar share and the rest,
    ///    shuffle both, and try the rest first with probability `epsilon`.
    /// 4. For each artist in turn, shuffle its paths and take the first file
    ///    that exists.
    ///
    /// A failed similarity lookup is logged and treated as an empty list.
    ///
    /// # Returns
    ///
    /// * `Ok(Selection)` - The chosen artist, path and the strategy used
    /// * `Err(SelectError)` - If no candidate has a file on disk
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NoTrackAvailable`] when no candidate artist has
    /// an existing file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use segue::index::ArtistIndex;
    /// use segue::selection::{SelectionConfig, SelectionPolicy};
    /// use segue::similarity::FixedSimilarity;
    ///
    /// let mut index = ArtistIndex::default();
    /// index.insert("Low", "Words", "/music/low/words.flac");
    /// index.insert("Grouper", "Heavy Water", "/music/grouper/heavy.flac");
    ///
    /// let provider = FixedSimilarity::new().with("Low", ["Grouper"]);
    /// let mut policy = SelectionPolicy::new(SelectionConfig::default());
    /// let choice = policy.select(&index, "Low", &provider)?;
    /// println!("{} by {}", choice.path, choice.artist);
    /// # Ok::<(), segue::error::SelectError>(())
    /// ```
    pub fn select<P: SimilarityProvider>(
        &mut self,
        index: &ArtistIndex,
        query_artist: &str,
        provider: P,
    ) -> Result<Selection, SelectError> {
        self.select_with(index, query_artist, provider, |path| Path::new(path).exists())
    }

    /// [`SelectionPolicy::select`] with a custom existence check.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NoTrackAvailable`] when `exists` rejects every
    /// file of every candidate.
    pub fn select_with<P, F>(
        &mut self,
        index: &ArtistIndex,
        query_artist: &str,
        provider: P,
        exists: F,
    ) -> Result<Selection, SelectError>
    where
        P: SimilarityProvider,
        F: Fn(&str) -> bool,
    {
        let similar = provider.similar_artists(query_artist).unwrap_or_else(|e| {
            warn!("Similarity lookup for \"{query_artist}\" failed: {e}");
            Vec::new()
        });

        let candidates = self.order_candidates(index, similar);
        self.first_existing(index, query_artist, candidates, exists)
    }

    /// Builds the candidate order from a ranked similarity list.
    pub fn order_candidates(&mut self, index: &ArtistIndex, similar: Vec<String>) -> Candidates {
        let known: Vec<String> = similar
            .into_iter()
            .filter(|artist| index.contains_artist(artist))
            .collect();

        // Drawn unconditionally so an empty list and a jump-out consume the
        // same randomness.
        let jump_out = self.rng.gen::<f64>() < self.config.jumpout_epsilon;

        if known.is_empty() || jump_out {
            let strategy = if known.is_empty() {
                warn!("No similar artist found, choosing completely randomly");
                Strategy::Random
            } else {
                info!("Jumping out of the similarity list");
                Strategy::JumpOut
            };
            let mut artists: Vec<String> = index.artists().map(str::to_owned).collect();
            artists.shuffle(&mut self.rng);
            return Candidates { strategy, artists };
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let split = ((known.len() as f64 * self.config.most_similar_fraction).floor() as usize)
            .min(known.len());
        let (most, lesser) = known.split_at(split);
        let mut most = most.to_vec();
        let mut lesser = lesser.to_vec();
        most.shuffle(&mut self.rng);
        lesser.shuffle(&mut self.rng);
        debug!(
            "{} similar artists in library: {} most similar, {} less similar",
            known.len(),
            most.len(),
            lesser.len()
        );

        let (strategy, first, second) = if self.rng.gen::<f64>() < self.config.epsilon {
            (Strategy::Explore, lesser, most)
        } else {
            (Strategy::Exploit, most, lesser)
        };
        let mut artists = first;
        artists.extend(second);
        Candidates { strategy, artists }
    }

    fn first_existing<F>(
        &mut self,
        index: &ArtistIndex,
        query_artist: &str,
        candidates: Candidates,
        exists: F,
    ) -> Result<Selection, SelectError>
    where
        F: Fn(&str) -> bool,
    {
        debug!("Trying {} artists ({})", candidates.artists.len(), candidates.strategy);

        for artist in candidates.artists {
            let mut paths = index.paths(&artist);
            if paths.is_empty() {
                continue;
            }
            paths.shuffle(&mut self.rng);

            if let Some(path) = paths.into_iter().find(|path| exists(path)) {
                info!("Selected \"{path}\" by \"{artist}\" ({})", candidates.strategy);
                return Ok(Selection {
                    path: path.to_owned(),
                    artist,
                    strategy: candidates.strategy,
                });
            }
            debug!("No file of \"{artist}\" exists any more");
        }

        Err(SelectError::NoTrackAvailable {
            artist: query_artist.to_owned(),
        })
    }
}
