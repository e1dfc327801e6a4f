//! # Command-Line Interface Module
//!
//! cmus calls the binary as its `status_display_program`, passing the current
//! track as bare `key value` pairs. That is the default mode:
//!
//! ```bash
//! segue status playing file /music/low/words.flac artist Low title Words
//! ```
//!
//! Options must come before the pairs. A few subcommands help with setup:
//!
//! - `artists`: print the decoded cache index as JSON
//! - `completion`: generate shell completions
//!
//! ## Setup in cmus
//!
//! ```text
//! :set status_display_program=segue
//! ```

use crate::cache::WordSize;
use crate::config::Config;
use crate::player::AddTo;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "segue")]
#[command(about = "Segue: queue the next track in cmus from an artist similar to the one playing")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub options: Options,

    /// Track status as alternating keys and values; one key must be "artist"
    #[arg(
        value_name = "KEY_VALUE",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub status: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Settings that override the config file.
#[derive(ClapArgs, Debug, Default, Clone)]
pub struct Options {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "SEGUE_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// cmus configuration directory holding `cache` and `lib.pl`
    #[arg(long, global = true, env = "CMUS_HOME", value_hint = clap::ValueHint::DirPath)]
    pub cmus_dir: Option<PathBuf>,

    /// Where to add the chosen track
    #[arg(long, global = true)]
    pub add_to: Option<AddTo>,

    /// Consider every cached track, not only those in the library
    #[arg(long, global = true)]
    pub all_tracks: bool,

    /// Stay in the foreground
    #[arg(long, global = true)]
    pub no_detach: bool,

    /// Print the chosen path instead of adding it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip the similarity lookup and choose at random
    #[arg(long, global = true)]
    pub offline: bool,

    /// Width of a C long in the cmus build that wrote the cache
    #[arg(long, global = true)]
    pub word_size: Option<WordSize>,

    /// Share of similar artists treated as most similar (0-1)
    #[arg(long, global = true)]
    pub most_similar_fraction: Option<f64>,

    /// Probability of trying less similar artists first (0-1)
    #[arg(long, global = true)]
    pub epsilon: Option<f64>,

    /// Probability of ignoring similarity entirely (0-1)
    #[arg(long, global = true)]
    pub jumpout_epsilon: Option<f64>,

    /// Last.fm API key
    #[arg(long, global = true, env = "LASTFM_API_KEY", hide_env_values = true)]
    pub lastfm_api_key: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Options {
    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.cmus_dir {
            config.cmus_dir = Some(dir.clone());
        }
        if let Some(add_to) = self.add_to {
            config.add_to = add_to;
        }
        if self.all_tracks {
            config.only_library_tracks = false;
        }
        if self.no_detach || self.dry_run {
            config.detach = false;
        }
        if let Some(word_size) = self.word_size {
            config.word_size = word_size;
        }
        if let Some(fraction) = self.most_similar_fraction {
            config.selection.most_similar_fraction = fraction;
        }
        if let Some(epsilon) = self.epsilon {
            config.selection.epsilon = epsilon;
        }
        if let Some(epsilon) = self.jumpout_epsilon {
            config.selection.jumpout_epsilon = epsilon;
        }
        if let Some(key) = &self.lastfm_api_key {
            config.lastfm_api_key = Some(key.clone());
        }
    }

    /// Default log filter for the verbosity count.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Helper subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the decoded cache index as JSON
    ///
    /// Shows every artist with its titles and paths, as selection would see
    /// them. Decode warnings go to stderr.
    Artists,

    /// Generate shell completions
    ///
    /// Usage: segue completion bash > ~/.local/share/bash-completion/completions/segue
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_status_pairs_parse() {
        let args = Args::try_parse_from([
            "segue", "status", "playing", "artist", "Low", "title", "-Words-",
        ])
        .expect("valid arguments");

        assert!(args.command.is_none());
        assert_eq!(args.status, vec!["status", "playing", "artist", "Low", "title", "-Words-"]);
    }

    #[test]
    fn test_options_before_pairs() {
        let args = Args::try_parse_from([
            "segue", "--dry-run", "--epsilon", "0.5", "--add-to", "playlist", "artist", "Low",
        ])
        .expect("valid arguments");

        assert!(args.options.dry_run);
        assert_eq!(args.options.epsilon, Some(0.5));
        assert_eq!(args.options.add_to, Some(AddTo::Playlist));
        assert_eq!(args.status, vec!["artist", "Low"]);
    }

    #[test]
    fn test_subcommands() {
        let args = Args::try_parse_from(["segue", "artists", "--all-tracks"]).expect("valid");
        assert!(matches!(args.command, Some(Command::Artists)));
        assert!(args.options.all_tracks);

        let args = Args::try_parse_from(["segue", "completion", "fish"]).expect("valid");
        assert!(matches!(args.command, Some(Command::Completion { shell: Shell::Fish })));
    }

    #[test]
    fn test_apply_overrides() {
        let options = Options {
            all_tracks: true,
            dry_run: true,
            word_size: Some(WordSize::Four),
            jumpout_epsilon: Some(1.0),
            ..Options::default()
        };
        let mut config = Config::default();
        options.apply(&mut config);

        assert!(!config.only_library_tracks);
        assert!(!config.detach);
        assert_eq!(config.word_size, WordSize::Four);
        assert_eq!(config.selection.jumpout_epsilon, 1.0);
        assert_eq!(config.add_to, AddTo::Queue);
    }

    #[test]
    fn test_log_level() {
        let mut options = Options::default();
        assert_eq!(options.log_level(), "warn");
        options.verbose = 2;
        assert_eq!(options.log_level(), "trace");
    }
}
