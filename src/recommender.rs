//! # Recommendation Pipeline
//!
//! Ties the pieces together for one request:
//!
//! ```text
//! reference track
//!   -> predict mood (classifier, decoded once to a label)
//!   -> filter candidates (strict, then relaxed)
//!   -> rank by weighted distance, keep top_n
//!   -> explain each pick
//! ```
//!
//! The catalog, model and weights live in a [`RecommenderContext`] built once
//! at startup and only ever borrowed immutably afterwards. Each request
//! keeps its scratch state (candidate lists, fallback tier) on its own stack,
//! so a context can be shared between threads as `&RecommenderContext`.

use crate::catalog::Catalog;
use crate::config::RuntimeConfig;
use crate::db;
use crate::error::{RecommendError, RecommendResult};
use crate::explain::{explain, Explanation};
use crate::filter::{filter_candidates, Candidates};
use crate::model::MoodModel;
use crate::predictor::{MoodPredictor, MoodQuery, MODEL_FEATURES};
use crate::ranker::rank;
use crate::track::{FeatureWeights, Track};
use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

/// One recommended track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
    pub track: &'a Track,
    pub distance: f64,
    pub explanation: Explanation,
}

/// Result of a recommendation request.
///
/// `NoCandidates` is a normal outcome: no other track shares the predicted
/// mood, even after relaxing genre and duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome<'a> {
    Recommended {
        mood: String,
        relaxed: bool,
        recommendations: Vec<Recommendation<'a>>,
    },
    NoCandidates {
        mood: String,
    },
}

impl<'a> Outcome<'a> {
    #[must_use]
    pub fn mood(&self) -> &str {
        match self {
            Outcome::Recommended { mood, .. } | Outcome::NoCandidates { mood } => mood,
        }
    }

    #[must_use]
    pub fn recommendations(&self) -> &[Recommendation<'a>] {
        match self {
            Outcome::Recommended { recommendations, .. } => recommendations,
            Outcome::NoCandidates { .. } => &[],
        }
    }
}

/// Process-wide, read-only state for recommendations.
#[derive(Debug)]
pub struct RecommenderContext {
    catalog: Catalog,
    model: MoodModel,
    weights: FeatureWeights,
}

impl RecommenderContext {
    /// Pair a catalog with a model trained on its mood vocabulary.
    ///
    /// # Errors
    ///
    /// - [`RecommendError::FeatureVectorLength`] if the classifier does not
    ///   take the ten-value feature vector
    /// - [`RecommendError::UnknownMood`] if a catalog mood is missing from the
    ///   model's labels; predicted labels could never match such tracks.
    pub fn new(catalog: Catalog, model: MoodModel) -> RecommendResult<Self> {
        let width = model.classifier().n_features();
        if width != MODEL_FEATURES {
            return Err(RecommendError::FeatureVectorLength {
                expected: MODEL_FEATURES,
                actual: width,
            });
        }

        let catalog_moods = catalog.moods();
        if let Some(mood) = catalog_moods.iter().find(|mood| !model.labels().contains(mood)) {
            return Err(RecommendError::UnknownMood((*mood).to_string()));
        }
        for label in model.labels().classes() {
            if !catalog_moods.contains(&label.as_str()) {
                warn!("Model label `{label}` never occurs in the catalog");
            }
        }

        Ok(Self {
            catalog,
            model,
            weights: FeatureWeights::default(),
        })
    }

    /// Load catalog and model from the configured paths.
    pub fn load(config: &RuntimeConfig) -> Result<Self> {
        let catalog = open_catalog(&config.catalog_path)?;
        let model = MoodModel::load(&config.model_path)?;
        Ok(Self::new(catalog, model)?)
    }

    #[must_use]
    pub fn with_weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn model(&self) -> &MoodModel {
        &self.model
    }

    #[must_use]
    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    #[must_use]
    pub fn predictor(&self) -> MoodPredictor<'_> {
        MoodPredictor::new(&self.catalog, &self.model)
    }

    /// Up to `top_n` explained recommendations for `reference`.
    pub fn recommend(&self, reference: &Track, top_n: usize) -> RecommendResult<Outcome<'_>> {
        if top_n == 0 {
            return Err(RecommendError::InvalidTopN);
        }

        let mood = self.predictor().predict_label(&MoodQuery::from(reference))?;
        debug!("Predicted mood `{mood}` for `{}` (catalog mood `{}`)", reference.name, reference.mood);

        let candidates = filter_candidates(&self.catalog, reference, mood);
        let relaxed = candidates.is_relaxed();
        let tracks = match &candidates {
            Candidates::Strict(tracks) | Candidates::Relaxed(tracks) => tracks,
            Candidates::Empty => return Ok(Outcome::NoCandidates { mood: mood.to_string() }),
        };

        let recommendations = rank(reference, tracks, &self.weights, top_n)?
            .into_iter()
            .map(|ranked| Recommendation {
                track: ranked.track,
                distance: ranked.distance,
                explanation: explain(reference, ranked.track, &self.weights),
            })
            .collect();

        Ok(Outcome::Recommended {
            mood: mood.to_string(),
            relaxed,
            recommendations,
        })
    }

    /// Look a track up by name, then recommend for it.
    ///
    /// `pick` chooses among several matches by catalog position.
    pub fn recommend_by_name(&self, query: &str, pick: Option<usize>, top_n: usize) -> RecommendResult<Outcome<'_>> {
        let reference = self.catalog.resolve(query, pick)?;
        self.recommend(reference, top_n)
    }
}

/// `.csv` files are parsed directly; anything else is a catalog database.
pub fn open_catalog(path: &Path) -> Result<Catalog> {
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Catalog::load_csv(path)
    } else {
        db::load_catalog(path)
    }
}
