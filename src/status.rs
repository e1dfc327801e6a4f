//! # Player Status Arguments
//!
//! cmus runs its `status_display_program` with the current state as
//! alternating keys and values:
//!
//! ```text
//! segue status playing file /music/low/words.flac artist Low title Words
//! ```
//!
//! Only `artist` is required.

use crate::error::StatusError;
use std::collections::HashMap;

/// Key/value view of the status arguments. Repeated keys keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackStatus {
    tags: HashMap<String, String>,
}

impl TrackStatus {
    /// Pairs up `args` as key, value, key, value...
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::OddArguments`] for an odd count and
    /// [`StatusError::MissingArtist`] when no `artist` key is present.
    pub fn from_pairs<I, S>(args: I) -> Result<Self, StatusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() % 2 != 0 {
            return Err(StatusError::OddArguments(args.len()));
        }

        let mut tags = HashMap::new();
        let mut iter = args.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            tags.insert(key, value);
        }

        let status = Self { tags };
        if status.artist().is_none() {
            return Err(StatusError::MissingArtist);
        }
        Ok(status)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.get("artist")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let status = TrackStatus::from_pairs([
            "status", "playing", "file", "/music/low/words.flac", "artist", "Low", "title", "Words",
        ])
        .expect("valid pairs");

        assert_eq!(status.artist(), Some("Low"));
        assert_eq!(status.get("title"), Some("Words"));
        assert_eq!(status.get("album"), None);
    }

    #[test]
    fn test_odd_argument_count() {
        assert_eq!(
            TrackStatus::from_pairs(["artist", "Low", "title"]),
            Err(StatusError::OddArguments(3))
        );
    }

    #[test]
    fn test_missing_artist() {
        assert_eq!(
            TrackStatus::from_pairs(["status", "stopped"]),
            Err(StatusError::MissingArtist)
        );
        assert_eq!(
            TrackStatus::from_pairs(Vec::<String>::new()),
            Err(StatusError::MissingArtist)
        );
    }

    #[test]
    fn test_repeated_key_keeps_last() {
        let status = TrackStatus::from_pairs(["artist", "Low", "artist", "Grouper"]).expect("valid");
        assert_eq!(status.artist(), Some("Grouper"));
    }
}
