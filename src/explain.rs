//! Human-readable reasons for a recommendation.

use crate::filter::DURATION_TOLERANCE;
use crate::track::{Feature, FeatureWeights, Track};
use serde::Serialize;
use std::fmt;

/// Why a candidate was recommended.
///
/// `principal` is always the dominant-feature reason; `others` holds the
/// qualitative matches (mood, genre, duration) in evaluation order and may
/// be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub principal: String,
    pub others: Vec<String>,
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Principal motivation: {}. Other factors: {}",
            self.principal,
            self.others.join(", ")
        )
    }
}

/// Feature with the smallest weighted absolute difference, with that
/// difference. Ties go to the earlier feature.
#[must_use]
pub fn dominant_feature(reference: &Track, candidate: &Track, weights: &FeatureWeights) -> (Feature, f64) {
    let weighted_delta = |feature: Feature| {
        (reference.features.get(feature) - candidate.features.get(feature)).abs() * weights.get(feature)
    };

    let mut best = (Feature::ALL[0], weighted_delta(Feature::ALL[0]));
    for feature in &Feature::ALL[1..] {
        let delta = weighted_delta(*feature);
        if delta < best.1 {
            best = (*feature, delta);
        }
    }
    best
}

pub fn explain(reference: &Track, candidate: &Track, weights: &FeatureWeights) -> Explanation {
    let mut others = Vec::new();

    if reference.mood == candidate.mood {
        others.push("same mood".to_string());
    }
    if reference.genre_code == candidate.genre_code {
        others.push("identical genre".to_string());
    }
    let duration_gap = reference.duration_ms.abs_diff(candidate.duration_ms);
    if duration_gap as f64 <= DURATION_TOLERANCE * reference.duration_ms as f64 {
        others.push(format!("similar duration ({:.1}s)", duration_gap as f64 / 1000.0));
    }

    let (feature, delta) = dominant_feature(reference, candidate, weights);
    Explanation {
        principal: format!("{feature} simile (Δ={delta:.3})"),
        others,
    }
}
