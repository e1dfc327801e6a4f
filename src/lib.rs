//! Picks the next track for cmus from an artist similar to the one playing.
//!
//! Core modules:
//! - [`cache`] - Decoder for the cmus binary track cache
//! - [`selection`] - Epsilon-greedy artist selection
//! - [`similarity`] - Similar-artist lookup (Last.fm)
//! - [`player`] - cmus remote control
//!
//! ### Supporting Modules
//!
//! - [`index`] - Artist → title → path index built from the cache
//! - [`library`] - `lib.pl` membership filter
//! - [`status`] - Status-program argument parsing
//! - [`config`] - Configuration file and cmus paths
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`app`] - One selection run, end to end
//! - [`error`] - Typed error kinds
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use segue::{cache, library, selection, similarity};
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let library = library::LibrarySet::load_or_empty(Path::new("/home/me/.cmus/lib.pl"));
//! let decoded = cache::read_cache(
//!     Path::new("/home/me/.cmus/cache"),
//!     Some(&library),
//!     cache::WordSize::Auto,
//! )?;
//! decoded.log_warnings();
//!
//! let lastfm = similarity::LastFm::new(std::env::var("LASTFM_API_KEY").ok(), Duration::from_secs(10));
//! let mut policy = selection::SelectionPolicy::new(selection::SelectionConfig::default());
//! let choice = policy.select(&decoded.index, "Low", &lastfm)?;
//! println!("{}", choice.path);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Reading the cache never fails on format problems: a bad signature, a
//! truncated file or a malformed record become [`error::DecodeWarning`]s next
//! to whatever could be decoded. A failed similarity lookup falls back to a
//! random artist. The only selection failure is
//! [`error::SelectError::NoTrackAvailable`].

pub mod app;
pub mod cache;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod index;
pub mod library;
pub mod player;
pub mod selection;
pub mod similarity;
pub mod status;
