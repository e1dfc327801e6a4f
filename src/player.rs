//! # cmus Remote Control
//!
//! Talks to a running cmus through the `cmus-remote` command-line tool, the
//! same way the rest of the ecosystem scripts it:
//!
//! - `cmus-remote -C` exits successfully only when cmus is reachable.
//! - `cmus-remote -q FILE` appends to the play queue.
//! - `cmus-remote -P FILE` appends to the playlist.
//!
//! Enqueueing is fire-and-forget: the child is spawned and not waited for.

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{Command, Stdio};

/// Where a chosen track is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AddTo {
    /// The play queue; plays next.
    #[default]
    Queue,
    /// The end of the playlist.
    Playlist,
}

impl AddTo {
    /// `cmus-remote` flag for this target.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Queue => "-q",
            Self::Playlist => "-P",
        }
    }
}

impl fmt::Display for AddTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Queue => "queue",
            Self::Playlist => "playlist",
        })
    }
}

/// The music player being steered.
pub trait Player {
    /// Whether the player answers remote commands.
    fn is_running(&self) -> bool;

    /// Hands `path` to the player.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent.
    fn enqueue(&self, path: &str, add_to: AddTo) -> Result<()>;
}

/// [`Player`] backed by the `cmus-remote` executable.
#[derive(Debug, Clone)]
pub struct CmusRemote {
    command: String,
}

impl CmusRemote {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for CmusRemote {
    fn default() -> Self {
        Self::new("cmus-remote")
    }
}

impl Player for CmusRemote {
    fn is_running(&self) -> bool {
        let status = Command::new(&self.command)
            .arg("-C")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("Failed to run {}: {e}", self.command);
                false
            }
        }
    }

    fn enqueue(&self, path: &str, add_to: AddTo) -> Result<()> {
        debug!("Running {} {} {path}", self.command, add_to.flag());
        Command::new(&self.command)
            .arg(add_to.flag())
            .arg(path)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to run {} to add {path} to the {add_to}", self.command))?;
        Ok(())
    }
}

/// Forks once; the parent exits immediately and the child carries on.
///
/// Called before the similarity lookup so the player is not blocked waiting
/// on the network. If the fork fails the run stays in the foreground.
pub fn detach() {
    // SAFETY: the process is still single-threaded here, and the parent
    // leaves through `_exit` without touching any shared state.
    match unsafe { libc::fork() } {
        0 => debug!("Detached from the calling process"),
        pid if pid > 0 => unsafe { libc::_exit(0) },
        _ => warn!("Could not detach, continuing in the foreground"),
    }
}
