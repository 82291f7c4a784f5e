//! Track records, audio features and the fixed feature weights.

use crate::error::{RecommendError, RecommendResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven secondary audio features used for similarity ranking.
///
/// Declaration order is the canonical iteration order: ties in the
/// explanation step are broken by it, and the classifier's feature vector
/// starts with these values in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Valence,
    Energy,
    Danceability,
    Tempo,
    Acousticness,
    Instrumentalness,
    Speechiness,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Valence,
        Feature::Energy,
        Feature::Danceability,
        Feature::Tempo,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Speechiness,
    ];

    /// Column name, as used in catalog files
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Valence => "valence",
            Feature::Energy => "energy",
            Feature::Danceability => "danceability",
            Feature::Tempo => "tempo",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Speechiness => "speechiness",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Continuous audio descriptors of a track.
/// Most lie in [0, 1]; tempo is unbounded BPM.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    pub tempo: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub speechiness: f64,
}

impl AudioFeatures {
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Valence => self.valence,
            Feature::Energy => self.energy,
            Feature::Danceability => self.danceability,
            Feature::Tempo => self.tempo,
            Feature::Acousticness => self.acousticness,
            Feature::Instrumentalness => self.instrumentalness,
            Feature::Speechiness => self.speechiness,
        }
    }

    /// Values in canonical feature order
    #[must_use]
    pub fn to_array(&self) -> [f64; 7] {
        Feature::ALL.map(|feature| self.get(feature))
    }

    /// First feature holding a NaN or infinite value, if any
    #[must_use]
    pub fn first_non_finite(&self) -> Option<Feature> {
        Feature::ALL
            .into_iter()
            .find(|&feature| !self.get(feature).is_finite())
    }
}

/// One catalog row.
///
/// Artist and genre carry both the display string and the integer code
/// assigned by the catalog's frozen encoders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub artist_code: u32,
    pub genre: String,
    pub genre_code: u32,
    pub mood: String,
    pub duration_ms: u64,
    pub features: AudioFeatures,
}

impl Track {
    /// Rejects non-finite features so NaN never reaches the distance sort.
    pub fn check_finite(&self) -> RecommendResult<()> {
        match self.features.first_non_finite() {
            Some(feature) => Err(RecommendError::MalformedTrack {
                track_id: self.id.clone(),
                reason: format!("{feature} is not a finite number"),
            }),
            None => Ok(()),
        }
    }
}

/// Per-feature multiplicative weights for distance and explanation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureWeights([f64; 7]);

impl Default for FeatureWeights {
    fn default() -> Self {
        // valence, energy, danceability, tempo, acousticness, instrumentalness, speechiness
        Self([2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0])
    }
}

impl FeatureWeights {
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Copy of these weights with one feature replaced.
    pub fn with(mut self, feature: Feature, weight: f64) -> RecommendResult<Self> {
        if !(weight.is_finite() && weight > 0.0) {
            return Err(RecommendError::InvalidWeight { feature: feature.name(), weight });
        }
        self.0[feature.index()] = weight;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|feature| (feature, self.get(feature)))
    }
}
