//! Mood prediction glue between catalog tracks and the classifier.
//!
//! The classifier sees ten values, always in this order:
//!
//! ```text
//! valence, energy, danceability, tempo, acousticness, instrumentalness,
//! speechiness, artist-code, duration_ms, genre-code
//! ```
//!
//! Artist and genre may arrive as display strings (a track from outside the
//! catalog) or as codes (a catalog track). Strings go through the catalog's
//! frozen encoders; an unseen string is an error.

use crate::catalog::Catalog;
use crate::error::RecommendResult;
use crate::model::MoodModel;
use crate::track::{AudioFeatures, Track};
use log::trace;

pub const MODEL_FEATURES: usize = 10;

/// A categorical field, raw or already encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Raw(String),
    Encoded(u32),
}

/// The fields the classifier needs from a track.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodQuery {
    pub features: AudioFeatures,
    pub artist: Category,
    pub genre: Category,
    pub duration_ms: u64,
}

impl MoodQuery {
    /// Query for a track outside the catalog, with display strings.
    pub fn raw(features: AudioFeatures, artist: &str, genre: &str, duration_ms: u64) -> Self {
        Self {
            features,
            artist: Category::Raw(artist.to_string()),
            genre: Category::Raw(genre.to_string()),
            duration_ms,
        }
    }
}

impl From<&Track> for MoodQuery {
    fn from(track: &Track) -> Self {
        Self {
            features: track.features,
            artist: Category::Encoded(track.artist_code),
            genre: Category::Encoded(track.genre_code),
            duration_ms: track.duration_ms,
        }
    }
}

/// Predicts moods with a loaded model, encoding categories through the
/// catalog the model is used with.
#[derive(Debug, Clone, Copy)]
pub struct MoodPredictor<'a> {
    catalog: &'a Catalog,
    model: &'a MoodModel,
}

impl<'a> MoodPredictor<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, model: &'a MoodModel) -> Self {
        Self { catalog, model }
    }

    /// Ten-value classifier input for `query`.
    pub fn feature_vector(&self, query: &MoodQuery) -> RecommendResult<[f64; MODEL_FEATURES]> {
        let artist = match &query.artist {
            Category::Raw(name) => self.catalog.artist_encoder().encode(name)?,
            Category::Encoded(code) => *code,
        };
        let genre = match &query.genre {
            Category::Raw(name) => self.catalog.genre_encoder().encode(name)?,
            Category::Encoded(code) => *code,
        };

        let [valence, energy, danceability, tempo, acousticness, instrumentalness, speechiness] =
            query.features.to_array();
        Ok([
            valence,
            energy,
            danceability,
            tempo,
            acousticness,
            instrumentalness,
            speechiness,
            f64::from(artist),
            query.duration_ms as f64,
            f64::from(genre),
        ])
    }

    /// Raw class id from the classifier; see [`MoodPredictor::predict_label`]
    /// for the decoded label.
    pub fn predict_mood(&self, query: &MoodQuery) -> RecommendResult<usize> {
        let vector = self.feature_vector(query)?;
        let class_id = self.model.classifier().predict(&vector)?;
        trace!("Classifier picked class {class_id} for {vector:?}");
        Ok(class_id)
    }

    /// Predicted mood, decoded once so it compares directly with catalog moods.
    pub fn predict_label(&self, query: &MoodQuery) -> RecommendResult<&'a str> {
        let class_id = self.predict_mood(query)?;
        let model: &'a MoodModel = self.model;
        model.decode(class_id)
    }
}
