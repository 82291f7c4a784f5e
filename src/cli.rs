//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Moodmatch using Clap derive macros.
//!
//! ## Commands
//!
//! - `recommend`: Suggest tracks similar in mood and sound to a reference track
//! - `search`: List catalog tracks whose name matches a query
//! - `predict`: Show the mood the classifier assigns to a track
//! - `import`: Load a CSV catalog into the SQLite store
//! - `completion`: Print a shell completion script
//!
//! ## Examples
//!
//! ```bash
//! moodmatch import ~/datasets/tracks_labeled.csv
//! moodmatch recommend "Bohemian Rhapsody"
//! moodmatch recommend "Alba" --pick 42 --top-n 3
//! ```

use clap::{Parser, Subcommand, ValueEnum};
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
///
/// The catalog and model locations are global so every subcommand sees the
/// same files. Both default to the Moodmatch data directory.
#[derive(Parser, Debug)]
#[command(name = "moodmatch")]
#[command(about = "Moodmatch: mood-aware track recommendations from audio features")]
#[command(version)]
pub struct Args {
    /// Catalog to read: a `.csv` file or a database written by `import`
    #[arg(long, global = true, env = "MOODMATCH_CATALOG", value_hint = clap::ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Mood model JSON (classifier plus mood labels)
    #[arg(long, global = true, env = "MOODMATCH_MODEL", value_hint = clap::ValueHint::FilePath)]
    pub model: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend tracks similar to a reference track
    ///
    /// Predicts the reference track's mood, keeps tracks of that mood with the
    /// same genre and a duration within 10%, and ranks them by weighted audio
    /// distance. When nothing passes, genre and duration are dropped.
    Recommend {
        /// Track name, or part of it (case-insensitive)
        #[arg(value_hint = clap::ValueHint::Other)]
        query: String,

        /// Number of recommendations
        #[arg(short = 'n', long, default_value_t = crate::ranker::DEFAULT_TOP_N,
              value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        top_n: usize,

        /// Catalog position to use when the name matches several tracks
        #[arg(short, long)]
        pick: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tracks whose name contains the query
    Search {
        /// Track name, or part of it (case-insensitive)
        #[arg(value_hint = clap::ValueHint::Other)]
        query: String,
    },

    /// Show the predicted mood of a track next to its catalog mood
    Predict {
        /// Track name, or part of it (case-insensitive)
        #[arg(value_hint = clap::ValueHint::Other)]
        query: String,

        /// Catalog position to use when the name matches several tracks
        #[arg(short, long)]
        pick: Option<usize>,
    },

    /// Import a labeled CSV catalog into the database
    ///
    /// The CSV needs the columns track_id, track_name, artists, track_genre,
    /// mood, duration_ms and the seven audio features. Rows are validated
    /// before anything is written.
    Import {
        /// CSV file to import
        #[arg(value_hint = clap::ValueHint::FilePath)]
        csv: PathBuf,

        /// Replace an existing catalog
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    ///
    /// Usage: moodmatch completion bash > ~/.local/share/bash-completion/completions/moodmatch
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
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_recommend_defaults() {
        let args = Args::try_parse_from(["moodmatch", "recommend", "Alba"]).unwrap();
        match args.command {
            Command::Recommend { query, top_n, pick, json } => {
                assert_eq!(query, "Alba");
                assert_eq!(top_n, crate::ranker::DEFAULT_TOP_N);
                assert_eq!(pick, None);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_zero_top_n_rejected_at_parse_time() {
        assert!(Args::try_parse_from(["moodmatch", "recommend", "Alba", "--top-n", "0"]).is_err());
    }

    #[test]
    fn test_global_paths_after_subcommand() {
        let args = Args::try_parse_from([
            "moodmatch", "search", "alba", "--catalog", "tracks.csv", "--model", "m.json",
        ])
        .unwrap();
        assert_eq!(args.catalog, Some(PathBuf::from("tracks.csv")));
        assert_eq!(args.model, Some(PathBuf::from("m.json")));
    }
}
