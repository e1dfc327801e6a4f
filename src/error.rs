//! # Error Kinds
//!
//! Typed failures of a selection run:
//!
//! - [`DecodeWarning`] - advisory problems found while reading the cmus cache.
//!   They are collected next to the partial index and never abort a run.
//! - [`SimilarityError`] - the similarity provider could not answer. Selection
//!   degrades to a random pick instead of failing.
//! - [`SelectError`] - selection walked every candidate without finding a file
//!   on disk. This is the only fatal selection condition.
//! - [`StatusError`] - the player called us with unusable arguments.
//!
//! Everything else (spawning `cmus-remote`, reading config) goes through
//! `anyhow` with context, like the rest of the binary.

use thiserror::Error;

/// Problems found while decoding the cache. Decoding keeps going (or stops
/// early) and reports these alongside whatever it managed to read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeWarning {
    /// The buffer is shorter than the file header or the magic bytes differ.
    #[error("cache signature is not valid")]
    InvalidSignature,

    /// A record header or string block runs past the end of the buffer.
    #[error("cache is truncated at offset {offset} after {records} records")]
    TruncatedCache { offset: usize, records: usize },

    /// A single record could not be interpreted and was skipped.
    #[error("malformed cache record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    /// Word-size detection found records that read correctly with both 4-
    /// and 8-byte words and picked `word`.
    #[error("cache records fit both 4- and 8-byte words, decoding with {word}; set word_size to be sure")]
    AmbiguousWordSize { word: usize },
}

/// Failure kinds of a similarity lookup.
#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("no API key configured for the similarity service")]
    MissingApiKey,

    #[error("artist \"{0}\" is unknown to the similarity service")]
    NotFound(String),

    #[error("similarity request failed: {0}")]
    Transport(String),

    #[error("could not parse similarity response: {0}")]
    Parse(String),
}

/// Selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Every candidate artist was tried and none had a file on disk.
    #[error("no existing track found to add (query artist \"{artist}\")")]
    NoTrackAvailable { artist: String },
}

/// Problems with the key/value arguments cmus passes to a status program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("expected key value pairs, got {0} arguments")]
    OddArguments(usize),

    #[error("no artist given")]
    MissingArtist,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_warning_messages() {
        let warning = DecodeWarning::TruncatedCache { offset: 40, records: 2 };
        assert_eq!(warning.to_string(), "cache is truncated at offset 40 after 2 records");

        let warning = DecodeWarning::MalformedRecord {
            offset: 8,
            reason: "odd tag count".to_string(),
        };
        assert!(warning.to_string().contains("offset 8"));
        assert!(warning.to_string().contains("odd tag count"));
    }

    #[test]
    fn test_select_error_names_artist() {
        let err = SelectError::NoTrackAvailable { artist: "Low".to_string() };
        assert!(err.to_string().contains("\"Low\""));
    }
}
