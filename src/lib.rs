//! Mood-aware track recommendations from audio features.
//!
//! Given a reference track, Moodmatch predicts its mood with a trained
//! classifier, keeps catalog tracks of that mood (same genre and a similar
//! duration when possible), ranks them by weighted distance over seven audio
//! features and explains each pick.
//!
//! Core modules:
//! - [`recommender`] - The full pipeline and its read-only context
//! - [`predictor`] - Feature-vector assembly and mood prediction
//! - [`filter`] - Strict and relaxed candidate selection
//! - [`ranker`] - Weighted Euclidean ranking
//! - [`explain`] - Human-readable reasons for each recommendation
//!
//! ### Supporting Modules
//!
//! - [`track`] - Tracks, audio features and feature weights
//! - [`encoder`] - Frozen categorical encoders
//! - [`catalog`] - The immutable track catalog, CSV loading and name lookup
//! - [`db`] - SQLite catalog store
//! - [`model`] - Decision-forest mood classifier and its label vocabulary
//! - [`error`] - Recommendation error kinds
//! - [`config`] - Configuration and data directory management
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use moodmatch::config::RuntimeConfig;
//! use moodmatch::recommender::RecommenderContext;
//!
//! let config = RuntimeConfig::new()?;
//! let context = RecommenderContext::load(&config)?;
//!
//! let outcome = context.recommend_by_name("Bohemian Rhapsody", None, config.top_n)?;
//! println!("Predicted mood: {}", outcome.mood());
//! for rec in outcome.recommendations() {
//!     println!("{} by {} [distance: {:.3}]", rec.track.name, rec.track.artist, rec.distance);
//!     println!("   {}", rec.explanation);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! The pipeline raises [`error::RecommendError`] at the point of detection.
//! Loaders that touch the filesystem return `anyhow::Result` with context.
//! An empty candidate set is not an error but
//! [`recommender::Outcome::NoCandidates`].

pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod encoder;
pub mod error;
pub mod explain;
pub mod filter;
pub mod model;
pub mod predictor;
pub mod ranker;
pub mod recommender;
pub mod track;
