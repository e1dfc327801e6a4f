//! # Similar Artists
//!
//! Selection only needs one thing from the outside world: given an artist,
//! a list of other artists ordered from most to least similar. That contract
//! is the [`SimilarityProvider`] trait.
//!
//! - [`LastFm`] asks the Last.fm `artist.getsimilar` endpoint over HTTPS and
//!   reads its JSON answer. Connect and read timeouts are set on the agent;
//!   the decoder and the selection policy never wait on the network.
//! - [`FixedSimilarity`] answers from an in-memory table. Used for offline
//!   runs and in tests.

use crate::error::SimilarityError;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const LASTFM_ENDPOINT: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm error code for "The artist you supplied could not be found".
const LASTFM_INVALID_PARAMETERS: i64 = 6;

/// Source of ranked similar-artist lists.
pub trait SimilarityProvider {
    /// Artists similar to `artist`, most similar first.
    ///
    /// # Errors
    ///
    /// Returns a [`SimilarityError`] when the lookup cannot be answered.
    fn similar_artists(&self, artist: &str) -> Result<Vec<String>, SimilarityError>;
}

impl<P: SimilarityProvider + ?Sized> SimilarityProvider for &P {
    fn similar_artists(&self, artist: &str) -> Result<Vec<String>, SimilarityError> {
        (**self).similar_artists(artist)
    }
}

/// Last.fm web service client backed by `ureq`.
pub struct LastFm {
    http_client: ureq::Agent,
    api_key: Option<String>,
    limit: u32,
}

impl LastFm {
    /// Creates a client. Without an API key every lookup fails with
    /// [`SimilarityError::MissingApiKey`].
    #[must_use]
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            limit: 100,
        }
    }

    /// Maximum number of similar artists to request.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl SimilarityProvider for LastFm {
    fn similar_artists(&self, artist: &str) -> Result<Vec<String>, SimilarityError> {
        let api_key = self.api_key.as_deref().ok_or(SimilarityError::MissingApiKey)?;
        let limit = self.limit.to_string();

        debug!("Asking Last.fm for artists similar to \"{artist}\"");
        let response = self
            .http_client
            .get(LASTFM_ENDPOINT)
            .query("method", "artist.getsimilar")
            .query("artist", artist)
            .query("autocorrect", "1")
            .query("limit", &limit)
            .query("api_key", api_key)
            .query("format", "json")
            .call();

        let body: Value = match response {
            Ok(response) => response
                .into_json()
                .map_err(|e| SimilarityError::Parse(e.to_string()))?,
            // Last.fm reports API errors with a 4xx status and a JSON body.
            Err(ureq::Error::Status(code, response)) => response
                .into_json()
                .map_err(|_| SimilarityError::Transport(format!("HTTP status {code}")))?,
            Err(e) => return Err(SimilarityError::Transport(e.to_string())),
        };

        parse_similar(artist, body)
    }
}

#[derive(Debug, Deserialize)]
struct SimilarResponse {
    similarartists: SimilarArtists,
}

#[derive(Debug, Deserialize)]
struct SimilarArtists {
    #[serde(default)]
    artist: Option<OneOrMany>,
}

/// Last.fm collapses single-element arrays into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<SimilarArtist>),
    One(SimilarArtist),
}

#[derive(Debug, Deserialize)]
struct SimilarArtist {
    name: String,
}

/// Turns an `artist.getsimilar` JSON body into a ranked name list.
fn parse_similar(artist: &str, body: Value) -> Result<Vec<String>, SimilarityError> {
    if let Some(code) = body.get("error").and_then(Value::as_i64) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(if code == LASTFM_INVALID_PARAMETERS {
            SimilarityError::NotFound(artist.to_string())
        } else {
            SimilarityError::Transport(format!("Last.fm error {code}: {message}"))
        });
    }

    let parsed: SimilarResponse =
        serde_json::from_value(body).map_err(|e| SimilarityError::Parse(e.to_string()))?;
    let names = match parsed.similarartists.artist {
        Some(OneOrMany::Many(artists)) => artists.into_iter().map(|a| a.name).collect(),
        Some(OneOrMany::One(artist)) => vec![artist.name],
        None => Vec::new(),
    };
    debug!("Last.fm returned {} similar artists", names.len());
    Ok(names)
}

/// In-memory similarity table. Unknown artists fail with
/// [`SimilarityError::NotFound`].
#[derive(Debug, Clone, Default)]
pub struct FixedSimilarity {
    table: HashMap<String, Vec<String>>,
}

impl FixedSimilarity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<I, S>(mut self, artist: &str, similar: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table
            .insert(artist.to_string(), similar.into_iter().map(Into::into).collect());
        self
    }
}

impl SimilarityProvider for FixedSimilarity {
    fn similar_artists(&self, artist: &str) -> Result<Vec<String>, SimilarityError> {
        self.table
            .get(artist)
            .cloned()
            .ok_or_else(|| SimilarityError::NotFound(artist.to_string()))
    }
}
