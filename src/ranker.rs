//! Weighted Euclidean ranking over the secondary audio features.
//!
//! ```text
//! distance(r, c) = sqrt( Σ_f weight[f] × (r[f] − c[f])² )
//! ```
//!
//! Candidates are sorted ascending with a stable sort, so equal distances
//! keep catalog order, then truncated to `top_n`.

use crate::error::{RecommendError, RecommendResult};
use crate::track::{AudioFeatures, FeatureWeights, Track};
use log::trace;
use serde::Serialize;

/// Default number of recommendations
pub const DEFAULT_TOP_N: usize = 5;

/// A candidate and its distance from the reference track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked<'a> {
    pub track: &'a Track,
    pub distance: f64,
}

/// Weighted Euclidean distance. Callers are expected to pass finite values;
/// see [`rank`] for the checked entry point.
#[must_use]
pub fn weighted_distance(a: &AudioFeatures, b: &AudioFeatures, weights: &FeatureWeights) -> f64 {
    weights
        .iter()
        .map(|(feature, weight)| {
            let delta = a.get(feature) - b.get(feature);
            weight * delta * delta
        })
        .sum::<f64>()
        .sqrt()
}

/// The `top_n` candidates closest to `reference`, nearest first.
///
/// # Errors
///
/// - [`RecommendError::InvalidTopN`] when `top_n` is zero
/// - [`RecommendError::MalformedTrack`] when the reference or a candidate
///   carries a non-finite feature
pub fn rank<'a>(
    reference: &Track,
    candidates: &[&'a Track],
    weights: &FeatureWeights,
    top_n: usize,
) -> RecommendResult<Vec<Ranked<'a>>> {
    if top_n == 0 {
        return Err(RecommendError::InvalidTopN);
    }
    reference.check_finite()?;

    let mut ranked = candidates
        .iter()
        .map(|&track| -> RecommendResult<Ranked<'a>> {
            track.check_finite()?;
            let distance = weighted_distance(&reference.features, &track.features, weights);
            trace!("{} -> {}: {distance:.4}", reference.id, track.id);
            Ok(Ranked { track, distance })
        })
        .collect::<RecommendResult<Vec<_>>>()?;

    // Stable: ties keep candidate order.
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(top_n);
    Ok(ranked)
}
