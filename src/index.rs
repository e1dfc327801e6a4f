//! # Artist Index
//!
//! The decoded view of the cache: artist name → track title → file path.
//! Built once by [`crate::cache::decode`], read-only afterwards.

use serde::Serialize;
use std::collections::BTreeMap;

/// Title → path for one artist.
pub type Tracks = BTreeMap<String, String>;

/// Artist names are kept exactly as decoded (case-sensitive). An artist key
/// exists once any record carried that artist tag, even when none of its
/// titles survived the library filter. Duplicate titles keep the last path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtistIndex {
    artists: BTreeMap<String, Tracks>,
}

impl ArtistIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `artist` has an entry, possibly with no tracks.
    pub fn ensure_artist(&mut self, artist: &str) {
        if !self.artists.contains_key(artist) {
            self.artists.insert(artist.to_owned(), Tracks::new());
        }
    }

    /// Records `path` as `artist`'s track called `title`; last write wins.
    pub fn insert(&mut self, artist: &str, title: &str, path: &str) {
        self.artists
            .entry(artist.to_owned())
            .or_default()
            .insert(title.to_owned(), path.to_owned());
    }

    #[must_use]
    pub fn contains_artist(&self, artist: &str) -> bool {
        self.artists.contains_key(artist)
    }

    #[must_use]
    pub fn tracks(&self, artist: &str) -> Option<&Tracks> {
        self.artists.get(artist)
    }

    /// All known paths of `artist`, empty when unknown.
    #[must_use]
    pub fn paths(&self, artist: &str) -> Vec<&str> {
        self.tracks(artist)
            .map(|tracks| tracks.values().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn artists(&self) -> impl Iterator<Item = &str> {
        self.artists.keys().map(String::as_str)
    }

    /// Number of artists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    /// Number of (artist, title) entries.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.artists.values().map(BTreeMap::len).sum()
    }

    /// True when every artist and track of `self` also appears in `other`
    /// with the same path.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.artists.iter().all(|(artist, tracks)| {
            other.tracks(artist).is_some_and(|theirs| {
                tracks
                    .iter()
                    .all(|(title, path)| theirs.get(title) == Some(path))
            })
        })
    }
}
