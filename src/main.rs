//! # Moodmatch - Mood-Aware Track Recommendations
//!
//! Command routing for the `moodmatch` binary. The library does the work;
//! this file loads the configured catalog and model, calls into it and
//! prints the results.
//!
//! ## Usage
//!
//! ```bash
//! # Import a labeled catalog into the data directory
//! moodmatch import tracks_labeled.csv
//!
//! # Recommend five tracks like "Alba"
//! moodmatch recommend "Alba"
//!
//! # Use files outside the data directory
//! moodmatch --catalog tracks.csv --model mood_model.json recommend "Alba" --json
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use moodmatch::catalog::Catalog;
use moodmatch::cli::{self, Args, Command};
use moodmatch::completion;
use moodmatch::config::RuntimeConfig;
use moodmatch::db;
use moodmatch::error::{RecommendError, RecommendResult};
use moodmatch::predictor::MoodQuery;
use moodmatch::recommender::{open_catalog, Outcome, RecommenderContext};
use moodmatch::track::Track;

/// Main entry point for the Moodmatch application.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=info moodmatch recommend ...` - Show filter fallbacks
/// - `RUST_LOG=moodmatch::ranker=trace moodmatch recommend ...` - Every candidate distance
fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = RuntimeConfig::default().overridden(args.catalog, args.model);
    debug!("Using catalog {} and model {}", config.catalog_path.display(), config.model_path.display());

    match args.command {
        Command::Recommend { query, top_n, pick, json } => {
            let context = RecommenderContext::load(&config)?;
            let outcome = report_ambiguity(context.recommend_by_name(&query, pick, top_n))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Command::Search { query } => {
            let catalog = open_catalog(&config.catalog_path)?;
            print_search(&catalog, &query);
        }
        Command::Predict { query, pick } => {
            let context = RecommenderContext::load(&config)?;
            let track = report_ambiguity(context.catalog().resolve(&query, pick))?;
            let predicted = context.predictor().predict_label(&MoodQuery::from(track))?;
            println!("{}", describe(track));
            println!("  predicted mood: {predicted}");
            println!("  catalog mood:   {}", track.mood);
        }
        Command::Import { csv, force } => {
            if is_csv(&config.catalog_path) {
                bail!(
                    "Catalog path {} is a CSV file; pass a database path with --catalog to import into",
                    config.catalog_path.display()
                );
            }
            info!("Importing catalog from: {}", csv.display());
            let count = db::import_csv(&config.catalog_path, &csv, force)?;
            println!("Imported {count} tracks into {}", config.catalog_path.display());
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}

/// On an ambiguous lookup, list the matches on stderr before failing.
fn report_ambiguity<T>(result: RecommendResult<T>) -> Result<T> {
    if let Err(RecommendError::AmbiguousLookup { matches, .. }) = &result {
        eprintln!("Several tracks match:");
        for m in matches {
            eprintln!("  [{}] {} by {}", m.position, m.name, m.artist);
        }
        eprintln!("Rerun with --pick <POS> to choose one.");
    }
    Ok(result?)
}

fn print_outcome(outcome: &Outcome<'_>) {
    match outcome {
        Outcome::NoCandidates { mood } => {
            println!("No recommendations possible: no other track has mood `{mood}`.");
        }
        Outcome::Recommended { mood, relaxed, recommendations } => {
            if *relaxed {
                println!("Predicted mood: {mood} (genre and duration filters relaxed)");
            } else {
                println!("Predicted mood: {mood}");
            }
            for (i, rec) in recommendations.iter().enumerate() {
                println!("{}. {} [distance: {:.3}]", i + 1, describe(rec.track), rec.distance);
                println!("   {}", rec.explanation);
            }
        }
    }
}

fn print_search(catalog: &Catalog, query: &str) {
    let mut found = 0;
    for (position, track) in catalog.search(query) {
        println!("[{position}] {} ({}, {})", describe(track), track.genre, track.mood);
        found += 1;
    }
    if found == 0 {
        println!("No track matches `{query}`");
    }
}

fn describe(track: &Track) -> String {
    format!("{} by {}", track.name, track.artist)
}

fn is_csv(path: &std::path::Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}
