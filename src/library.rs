//! # Library Membership
//!
//! cmus writes `lib.pl` on exit: one absolute path per line, covering every
//! track in the library view. Segue only uses it as a filter so that tracks
//! which are cached but were removed from the library are never queued.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Set of paths considered "in the library". Never mutated after load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySet {
    paths: HashSet<String>,
}

impl LibrarySet {
    /// Reads a newline-delimited path list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a line cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("could not read {}", path.display()))
    }

    /// Like [`LibrarySet::load`], but a missing or unreadable file only warns
    /// and yields an empty set.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(set) => {
                debug!("Loaded {} library paths from {}", set.len(), path.display());
                set
            }
            Err(e) => {
                warn!("{e:#}");
                Self::default()
            }
        }
    }

    /// Parses one path per line. Blank lines are ignored.
    ///
    /// Lines are split on `\n` only. A line that is not UTF-8 is skipped with
    /// a warning: the cache decoder never indexes such paths either, so it
    /// could not match anything.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut paths = HashSet::new();
        let mut skipped = 0_usize;
        for line in BufReader::new(reader).split(b'\n') {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match String::from_utf8(line) {
                Ok(path) => {
                    paths.insert(path);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(
                        "Skipping library path that is not UTF-8: {}",
                        String::from_utf8_lossy(e.as_bytes())
                    );
                }
            }
        }
        if skipped > 0 {
            debug!("{skipped} library paths skipped");
        }
        Ok(Self { paths })
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LibrarySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}
